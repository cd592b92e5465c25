//! Credentials, login responses and the session the client keeps.
//!
//! # Design
//! The client stores only the access token and account id (`SessionState`).
//! `Session` is the caller-facing record that also carries the person id and
//! an absolute expiry, so it can be persisted and later fed back through
//! `CoziClient::resume`. Expiry is never enforced by the client.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Username and password sent to the login endpoint. Not retained.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body returned by `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub account_id: String,
    pub account_person_id: String,
    pub access_token: String,
    /// Token lifetime in seconds, counted from when the login was answered.
    pub expires_in: u64,
}

impl AuthResponse {
    /// Convert to a persistable session, anchoring `expires_in` at `issued_at`.
    pub fn session(&self, issued_at: DateTime<Utc>) -> Session {
        let lifetime = i64::try_from(self.expires_in).unwrap_or(i64::MAX);
        let expires_at = Duration::try_seconds(lifetime)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Session {
            access_token: self.access_token.clone(),
            account_id: self.account_id.clone(),
            account_person_id: self.account_person_id.clone(),
            expires_at,
        }
    }
}

/// A previously obtained session, suitable for storing between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub account_id: String,
    pub account_person_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// What the client holds between calls.
#[derive(Clone, Default)]
pub(crate) struct SessionState {
    pub token: Option<String>,
    pub account_id: Option<String>,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl SessionState {
    /// Replace the token; keep the previous account id unless a new one is given.
    pub fn assign(&mut self, token: String, account_id: Option<String>) {
        self.token = Some(token);
        if let Some(account_id) = account_id {
            self.account_id = Some(account_id);
        }
    }
}
