//! The auth token store.

use crate::error::Result;
use crate::persistence::{FilePersistence, MemoryPersistence, StorageKind, TokenPersistence};
use crate::session::{AuthSession, AuthUser};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide auth state with an explicit lifecycle.
///
/// Built once at start-up with its persistence backend, then
/// [`rehydrated`](AuthStore::rehydrate) to pick up a session saved by an
/// earlier run. Reads are served from memory; writes go through to the
/// backend before the in-memory copy changes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vibes_auth::{AuthStore, MemoryPersistence};
///
/// # fn main() -> vibes_auth::Result<()> {
/// let store = AuthStore::new(Arc::new(MemoryPersistence::new()));
/// store.rehydrate()?;
/// assert!(store.token().is_none());
///
/// store.set_token("tok-1", None)?;
/// assert_eq!(store.token().as_deref(), Some("tok-1"));
///
/// store.logout()?;
/// assert!(!store.is_authenticated());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AuthStore {
    persistence: Arc<dyn TokenPersistence>,
    session: RwLock<Option<AuthSession>>,
    hydrated: AtomicBool,
}

impl AuthStore {
    /// Create a store over the given backend. Nothing is loaded yet.
    #[must_use]
    pub fn new(persistence: Arc<dyn TokenPersistence>) -> Self {
        Self {
            persistence,
            session: RwLock::new(None),
            hydrated: AtomicBool::new(false),
        }
    }

    /// Create a store with the backend for `kind`.
    ///
    /// `path` is only used by [`StorageKind::Local`].
    #[must_use]
    pub fn for_kind(kind: StorageKind, path: impl Into<PathBuf>) -> Self {
        let persistence: Arc<dyn TokenPersistence> = match kind {
            StorageKind::Local => Arc::new(FilePersistence::new(path)),
            StorageKind::Session => Arc::new(MemoryPersistence::new()),
        };
        Self::new(persistence)
    }

    /// Load the persisted session into memory.
    ///
    /// Returns whether a session was found. Calling it again reloads from
    /// the backend.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read. The in-memory state is
    /// left untouched in that case.
    #[tracing::instrument(skip(self), fields(storage = %self.persistence.kind()))]
    pub fn rehydrate(&self) -> Result<bool> {
        let loaded = self.persistence.load()?;
        let found = loaded.is_some();
        *self.write() = loaded;
        self.hydrated.store(true, Ordering::Release);
        tracing::debug!(found, "Auth store rehydrated");
        Ok(found)
    }

    /// Whether [`AuthStore::rehydrate`] has completed at least once.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::Acquire)
    }

    /// Which backend this store persists to.
    #[must_use]
    pub fn storage_kind(&self) -> StorageKind {
        self.persistence.kind()
    }

    /// Current bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    /// Current user, when the login response included one.
    #[must_use]
    pub fn user(&self) -> Option<AuthUser> {
        self.read().as_ref().and_then(|s| s.user.clone())
    }

    /// Whether a token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Store a new token, replacing any previous session.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be written; memory is unchanged.
    pub fn set_token(&self, token: impl Into<String>, user: Option<AuthUser>) -> Result<()> {
        let session = AuthSession::new(token.into(), user, Utc::now());
        self.persistence.save(&session)?;
        *self.write() = Some(session);
        tracing::info!(storage = %self.persistence.kind(), "Auth token stored");
        Ok(())
    }

    /// Forget the session in memory and in the backend.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be cleared. Memory is cleared
    /// regardless, so the process stops sending the token.
    pub fn logout(&self) -> Result<()> {
        *self.write() = None;
        let cleared = self.persistence.clear();
        if let Err(error) = &cleared {
            tracing::warn!(%error, "Failed to clear persisted auth session");
        } else {
            tracing::info!("Logged out");
        }
        cleared
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<AuthSession>> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<AuthSession>> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}
