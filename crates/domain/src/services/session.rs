use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use moka::sync::Cache;
use thiserror::Error;
use tracing::debug;

use crate::model::{fingerprint, random_hex, UserId};

/// Bytes of OS randomness behind each session token and OAuth state.
const SECRET_BYTES: usize = 32;

/// A signed-in DJ as resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
}

/// In-memory session and pending-sign-in registry.
///
/// Only SHA3 fingerprints of the secrets are used as cache keys; the raw
/// token lives in the client's cookie.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Cache<String, Session>,
    pending_states: Cache<String, ()>,
}

impl InMemorySessionStore {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
    pub const DEFAULT_CAPACITY: u64 = 100_000;
    pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);
    /// Longer TTLs are clamped to this; moka rejects lifetimes past 1000 years.
    pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: u64) -> Self {
        let capacity = capacity.max(1);
        let ttl = ttl.min(Self::MAX_TTL);
        Self {
            sessions: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(capacity)
                .build(),
            pending_states: Cache::builder()
                .time_to_live(Self::STATE_TTL)
                .max_capacity(capacity)
                .build(),
        }
    }

    /// Creates a session for `user_id` and returns the raw bearer token.
    pub fn issue(&self, user_id: UserId) -> Result<String, SessionError> {
        let token = new_secret()?;
        debug!(user = %user_id, "session issued");
        self.sessions.insert(
            fingerprint(&token),
            Session {
                user_id,
                issued_at: Utc::now(),
            },
        );
        counter!("sessions_issued_total").increment(1);
        Ok(token)
    }

    pub fn resolve(&self, token: &str) -> Option<Session> {
        self.sessions.get(&fingerprint(token))
    }

    pub fn revoke(&self, token: &str) {
        self.sessions.invalidate(&fingerprint(token));
    }

    /// Registers a fresh CSRF state for an outgoing authorization redirect.
    pub fn begin_sign_in(&self) -> Result<String, SessionError> {
        let state = new_secret()?;
        self.pending_states.insert(fingerprint(&state), ());
        Ok(state)
    }

    /// Consumes a pending state. Returns `false` for unknown, expired or
    /// already used states.
    pub fn complete_sign_in(&self, state: &str) -> bool {
        let known = self.pending_states.remove(&fingerprint(state)).is_some();
        if !known {
            counter!("sessions_rejected_states_total").increment(1);
        }
        known
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}

fn new_secret() -> Result<String, SessionError> {
    random_hex::<SECRET_BYTES>().map_err(|err| SessionError::Rng(err.to_string()))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("failed to gather randomness: {0}")]
    Rng(String),
}
