//! Durable storage for the session token.
//!
//! The stored document mirrors what the web client kept under the
//! `auth-storage` key: `{"state":{"token":...},"version":0}`.

use crate::error::ClientError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed key the session is stored under.
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

const STORAGE_VERSION: u32 = 0;

/// Load/save capability backing a persistent [`SessionStore`](super::SessionStore).
pub trait TokenStorage: Send + Sync {
    /// Token saved by a previous run, if any.
    fn load(&self) -> Result<Option<String>, ClientError>;

    /// Replace the stored token. `None` records a signed-out session.
    fn save(&self, token: Option<&str>) -> Result<(), ClientError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    state: SessionState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionState {
    #[serde(default)]
    token: Option<String>,
}

/// JSON file `<dir>/auth-storage.json`.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage inside `dir` under the fixed session key.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{SESSION_STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, ClientError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::warn!(
                    "Cannot read session file {}: {e}; starting signed out",
                    self.path.display()
                );
                return Ok(None);
            }
        };

        match serde_json::from_str::<PersistedSession>(&contents) {
            Ok(persisted) => Ok(persisted.state.token),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable session file {}: {e}",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    fn save(&self, token: Option<&str>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let persisted = PersistedSession {
            state: SessionState {
                token: token.map(str::to_string),
            },
            version: STORAGE_VERSION,
        };
        let json = serde_json::to_string(&persisted)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-process storage for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
    saves: Mutex<usize>,
}

impl MemoryTokenStorage {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
            saves: Mutex::new(0),
        }
    }

    pub fn stored(&self) -> Option<String> {
        self.token.lock().clone()
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: Option<&str>) -> Result<(), ClientError> {
        *self.token.lock() = token.map(str::to_string);
        *self.saves.lock() += 1;
        Ok(())
    }
}

impl<S: TokenStorage + ?Sized> TokenStorage for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<String>, ClientError> {
        (**self).load()
    }

    fn save(&self, token: Option<&str>) -> Result<(), ClientError> {
        (**self).save(token)
    }
}
