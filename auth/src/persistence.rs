//! Persistence backends for the auth session.
//!
//! The backend is chosen once, when the [`AuthStore`](crate::AuthStore) is
//! built, and injected into it. `Local` survives restarts (a JSON file);
//! `Session` lives only as long as the process.

use crate::error::{AuthError, Result};
use crate::session::AuthSession;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

/// Which persistence backend holds the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Durable storage that survives restarts.
    #[default]
    Local,
    /// Process-scoped storage, gone on exit.
    Session,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Session => write!(f, "session"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "session" => Ok(Self::Session),
            other => Err(AuthError::UnknownStorageKind(other.to_string())),
        }
    }
}

/// Session persistence.
///
/// Implementations only move bytes; the [`AuthStore`](crate::AuthStore)
/// owns the in-memory copy and decides when to load, save and clear.
pub trait TokenPersistence: Send + Sync + fmt::Debug {
    /// Which kind of storage this backend provides.
    fn kind(&self) -> StorageKind;

    /// Load the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be read or holds undecodable data.
    fn load(&self) -> Result<Option<AuthSession>>;

    /// Persist the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be written.
    fn save(&self, session: &AuthSession) -> Result<()>;

    /// Remove the persisted session. Clearing empty storage succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the storage cannot be written.
    fn clear(&self) -> Result<()>;
}

/// Durable backend: one JSON file.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    /// Create a backend writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this backend reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> AuthError {
        AuthError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenPersistence for FilePersistence {
    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    fn load(&self) -> Result<Option<AuthSession>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AuthError::CorruptSession {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    fn save(&self, session: &AuthSession) -> Result<()> {
        let encoded =
            serde_json::to_vec_pretty(session).map_err(|e| AuthError::Encode(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        // Write-then-rename so a crash never leaves a half-written session
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, encoded).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-scoped backend.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: Mutex<Option<AuthSession>>,
}

impl MemoryPersistence {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds a session.
    #[must_use]
    pub fn with_session(session: AuthSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl TokenPersistence for MemoryPersistence {
    fn kind(&self) -> StorageKind {
        StorageKind::Session
    }

    fn load(&self) -> Result<Option<AuthSession>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &AuthSession) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
