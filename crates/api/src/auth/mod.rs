//! Identity-provider sign-in and session extraction.

mod extractor;
mod provider;

pub use extractor::{removal_cookie, session_cookie, AuthenticatedUser, SESSION_COOKIE};
pub use provider::{IdentityProvider, OAuthProvider};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-in state is unknown or expired")]
    InvalidState,
    #[error("sign-in was cancelled: {0}")]
    Denied(String),
    #[error("identity provider error: {0}")]
    Provider(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(value: reqwest::Error) -> Self {
        Self::Provider(value.to_string())
    }
}
