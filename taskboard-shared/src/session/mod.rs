/// Client session
///
/// - `state`: the `Session` value and its invariant
/// - `store`: the async store that owns it and the persisted token

pub mod state;
pub mod store;

pub use state::{AuthStatus, Session};
pub use store::{SessionEvent, SessionStore};
