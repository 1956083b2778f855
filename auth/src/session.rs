//! Session data held by the auth store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed-in user as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Backend user id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Role (`customer`, `vendor`, `corporate`, ...).
    #[serde(default)]
    pub role: Option<String>,
}

/// A bearer token plus the user it belongs to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token sent on API requests.
    pub token: String,
    /// User the token was issued for, when known.
    #[serde(default)]
    pub user: Option<AuthUser>,
    /// When the token was stored.
    pub stored_at: DateTime<Utc>,
}

impl AuthSession {
    /// Create a new session.
    #[must_use]
    pub const fn new(token: String, user: Option<AuthUser>, stored_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user,
            stored_at,
        }
    }
}

// Tokens never reach logs
impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .field("stored_at", &self.stored_at)
            .finish()
    }
}
