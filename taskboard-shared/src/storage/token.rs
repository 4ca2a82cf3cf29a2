/// Persisted bearer token storage
///
/// The client keeps exactly one opaque token between runs, under the fixed
/// key [`TOKEN_KEY`]. Gateways only *read* it (to attach the bearer header);
/// the session store is the only writer.
///
/// # Backends
///
/// - [`FileTokenStore`]: JSON file, `0600` on unix. Default location is
///   `~/.config/taskboard/auth.json`.
/// - [`MemoryTokenStore`]: process-local, for tests and ephemeral sessions.
///
/// # File format
///
/// ```json
/// { "token": "eyJhbGciOi..." }
/// ```
///
/// Tokens are never logged.
///
/// # Example
///
/// ```
/// use taskboard_shared::storage::{MemoryTokenStore, TokenStore};
///
/// let store = MemoryTokenStore::new();
/// store.save("abc").unwrap();
/// assert_eq!(store.load().unwrap().as_deref(), Some("abc"));
/// store.clear().unwrap();
/// assert!(store.load().unwrap().is_none());
/// ```

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key the token is stored under
pub const TOKEN_KEY: &str = "token";

/// Token file name inside the config directory
pub const TOKEN_FILE: &str = "auth.json";

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Token storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file exists but is not valid JSON
    #[error("Token storage at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Lock poisoned by a panicking writer
    #[error("Token storage lock poisoned")]
    Poisoned,
}

/// Persisted token backend
pub trait TokenStore: Send + Sync {
    /// Reads the persisted token, if any
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persists a token, replacing any previous one
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Removes the persisted token
    ///
    /// Clearing an already-empty store succeeds.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Default token file location (`~/.config/taskboard/auth.json`)
///
/// Falls back to the working directory when no home directory is known.
pub fn default_token_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".config").join("taskboard"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TOKEN_FILE)
}

/// File-backed token store
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store backed by `path`
    ///
    /// The file and its parent directory are created lazily on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`default_token_path`]
    pub fn at_default_location() -> Self {
        Self::new(default_token_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let contents = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(io_err)?;
        file.write_all(contents.as_bytes()).map_err(io_err)?;

        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let entries = self.read_entries()?;
        Ok(entries.get(TOKEN_KEY).filter(|t| !t.is_empty()).cloned())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }

        // A corrupt file is replaced rather than preserved
        let mut entries = self.read_entries().unwrap_or_default();
        entries.remove(TOKEN_KEY);
        self.write_entries(&entries)
    }
}

/// In-memory token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let guard = self.token.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        let mut guard = self.token.lock().map_err(|_| StorageError::Poisoned)?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self.token.lock().map_err(|_| StorageError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}
