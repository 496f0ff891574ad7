use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use hearme_domain::model::{
    quote_message, BannedWordFilter, MessageId, MessageQuery, MessageRecord, NewMessage, ShowId,
};
use hearme_domain::storage::{BannedWordStore, MessageStore, SettingsStore, ShowStore};
use metrics::counter;
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;
use tracing::{debug, info};

use crate::state::AppState;

use super::ApiError;

pub const MAX_DISPLAY_NAME_CHARS: usize = 64;
pub const MAX_CONTENT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum SubmitOutcome {
    Accepted,
    ShowEnded,
    Invalid,
    Banned,
}

fn record_submission(outcome: SubmitOutcome) {
    let label: &'static str = outcome.into();
    counter!("api_messages_submitted_total", "outcome" => label).increment(1);
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageRequest {
    pub show_id: String,
    pub display_name: String,
    pub content: String,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub payment_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub show_id: String,
    pub display_name: String,
    pub content: String,
    pub payment: i64,
    pub paid: bool,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRecord> for MessageResponse {
    fn from(value: MessageRecord) -> Self {
        Self {
            id: value.id.into_inner(),
            show_id: value.show_id.into_inner(),
            display_name: value.display_name,
            content: value.content,
            payment: value.payment,
            paid: value.paid,
            payment_id: value.payment_ref,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    #[serde(default)]
    pub paid_only: Option<bool>,
    #[serde(default)]
    pub since: Option<String>,
}

impl MessagesQuery {
    fn to_filter(&self) -> Result<MessageQuery, ApiError> {
        let since = match self.since.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| ApiError::BadRequest("since must be an RFC 3339 timestamp".into()))?
                    .with_timezone(&Utc),
            ),
        };
        Ok(MessageQuery {
            paid_only: self.paid_only.unwrap_or(false),
            since,
        })
    }
}

pub async fn submit_message_handler(
    state: web::Data<AppState>,
    payload: web::Json<SubmitMessageRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let show_id = ShowId::parse(&payload.show_id)?;
    let show = state
        .storage()
        .find_show(&show_id)
        .await?
        .ok_or(ApiError::NotFound("show"))?;
    if !show.active {
        record_submission(SubmitOutcome::ShowEnded);
        return Err(ApiError::ShowEnded);
    }

    let display_name = bounded_text(&payload.display_name, "displayName", MAX_DISPLAY_NAME_CHARS)
        .inspect_err(|_| record_submission(SubmitOutcome::Invalid))?;
    let content = bounded_text(&payload.content, "content", MAX_CONTENT_CHARS)
        .inspect_err(|_| record_submission(SubmitOutcome::Invalid))?;

    let filter = BannedWordFilter::new(state.storage().banned_words(&show.user_id).await?);
    if let Some(word) = filter
        .find_match(&display_name)
        .or_else(|| filter.find_match(&content))
    {
        debug!(show = %show.id, word, "message rejected by banned word filter");
        record_submission(SubmitOutcome::Banned);
        return Err(ApiError::BannedContent);
    }

    let settings = state.storage().find_settings(&show.user_id).await?;
    let payment = quote_message(&content, settings.as_ref());
    let payment_ref = payload
        .payment_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let message = state
        .storage()
        .insert_message(NewMessage {
            id: MessageId::generate()?,
            show_id: show.id,
            display_name,
            content,
            payment,
            paid: payload.paid,
            payment_ref,
            created_at: Utc::now(),
        })
        .await?;

    record_submission(SubmitOutcome::Accepted);
    info!(
        show = %message.show_id,
        message = %message.id,
        payment = message.payment,
        paid = message.paid,
        "message accepted"
    );
    Ok(HttpResponse::Created().json(MessageResponse::from(message)))
}

pub async fn list_messages_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<MessagesQuery>,
) -> Result<HttpResponse, ApiError> {
    let show_id = ShowId::parse(&path.into_inner())?;
    let filter = query.to_filter()?;
    if state.storage().find_show(&show_id).await?.is_none() {
        return Err(ApiError::NotFound("show"));
    }

    let messages = state.storage().list_messages(&show_id, &filter).await?;
    let body: Vec<MessageResponse> = messages.into_iter().map(MessageResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Trims `raw` and checks it is non-empty and at most `max_chars` long.
fn bounded_text(raw: &str, field: &str, max_chars: usize) -> Result<String, ApiError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(ApiError::BadRequest(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}
