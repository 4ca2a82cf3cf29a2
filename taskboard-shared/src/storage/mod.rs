/// Client-side durable storage
///
/// Only the bearer token outlives the process.

pub mod token;

pub use token::{default_token_path, FileTokenStore, MemoryTokenStore, StorageError, TokenStore, TOKEN_KEY};
