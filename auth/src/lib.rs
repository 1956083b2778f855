//! # Vibes Auth
//!
//! Bearer-token storage for Vibes API clients.
//!
//! The [`AuthStore`] is an explicit object constructed at start-up rather
//! than a global: the caller picks a persistence backend
//! ([`StorageKind::Local`] for a JSON file that survives restarts,
//! [`StorageKind::Session`] for process memory), calls
//! [`AuthStore::rehydrate`] once, then shares the store (usually in an
//! `Arc`) with whatever sends authenticated requests.
//!
//! ```text
//! new(backend) ──► rehydrate() ──► token() / set_token() / logout()
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod error;
pub mod persistence;
pub mod session;
pub mod store;

pub use error::{AuthError, Result};
pub use persistence::{FilePersistence, MemoryPersistence, StorageKind, TokenPersistence};
pub use session::{AuthSession, AuthUser};
pub use store::AuthStore;
