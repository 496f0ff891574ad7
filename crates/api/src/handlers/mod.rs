pub mod auth;
pub mod messages;
pub mod metrics;
pub mod settings;
pub mod shows;

pub use auth::{callback_handler, session_handler, sign_in_handler, sign_out_handler};
pub use messages::{list_messages_handler, submit_message_handler};
pub use metrics::metrics_handler;
pub use settings::{
    get_banned_words_handler, get_settings_handler, replace_banned_words_handler,
    update_settings_handler,
};
pub use shows::{
    active_show_handler, create_show_handler, end_show_handler, past_shows_handler,
    public_show_handler, show_details_handler,
};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use hearme_domain::model::IdFormatError;
use hearme_domain::services::session::SessionError;
use hearme_domain::storage::StorageError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdFormatError),
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("show has ended")]
    ShowEnded,
    #[error("content contains a banned word")]
    BannedContent,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("session failure: {0}")]
    Session(#[from] SessionError),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ShowEnded => StatusCode::CONFLICT,
            ApiError::BannedContent => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Auth(AuthError::InvalidState | AuthError::Denied(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Auth(AuthError::Provider(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Session(_) | ApiError::Storage(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        }
        HttpResponse::build(status).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

impl From<getrandom::Error> for ApiError {
    fn from(value: getrandom::Error) -> Self {
        Self::Internal(format!("failed to gather randomness: {value}"))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
