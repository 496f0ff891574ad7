use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use hearme_domain::model::{
    total_payments, DateRange, MessageQuery, NewShow, ShowId, ShowRecord, ShowSummary,
    DEFAULT_PRICE_PER_CHAR,
};
use hearme_domain::storage::{
    BannedWordStore, MessageStore, SettingsStore, ShowStore, UserStore,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::state::AppState;

use super::messages::MessageResponse;
use super::ApiError;

const FALLBACK_DJ_NAME: &str = "DJ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum ShowEvent {
    Started,
    Ended,
    AlreadyEnded,
}

fn record_show_event(event: ShowEvent) {
    let label: &'static str = event.into();
    counter!("api_show_events_total", "event" => label).increment(1);
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreateShowRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowResponse {
    pub id: String,
    pub title: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_earnings: Option<i64>,
}

impl From<ShowRecord> for ShowResponse {
    fn from(value: ShowRecord) -> Self {
        Self {
            id: value.id.into_inner(),
            title: value.title,
            active: value.active,
            created_at: value.created_at,
            ended_at: value.ended_at,
            total_earnings: value.total_earnings,
        }
    }
}

/// What the audience page needs to render the submission form.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicShowResponse {
    pub id: String,
    pub title: String,
    pub dj_name: String,
    pub price_per_char: i64,
    pub banned_words: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PastShowsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastShowResponse {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub message_count: u64,
    pub total_earnings: i64,
}

impl From<ShowSummary> for PastShowResponse {
    fn from(value: ShowSummary) -> Self {
        Self {
            id: value.show.id.into_inner(),
            title: value.show.title,
            created_at: value.show.created_at,
            ended_at: value.show.ended_at,
            message_count: value.message_count,
            total_earnings: value.show.total_earnings.unwrap_or(0),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowDetailsResponse {
    pub id: String,
    pub title: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub message_count: usize,
    pub paid_message_count: usize,
    pub total_earnings: i64,
    pub messages: Vec<MessageResponse>,
}

pub async fn create_show_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: Option<web::Json<CreateShowRequest>>,
) -> Result<HttpResponse, ApiError> {
    let now = Utc::now();
    let closed = state
        .storage()
        .close_active_shows(&user.user_id, now)
        .await?;
    if closed > 0 {
        info!(user = %user.user_id, closed, "closed previously active shows");
    }

    let title = payload
        .and_then(|payload| payload.into_inner().title)
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| default_title(now));
    let show = state
        .storage()
        .insert_show(NewShow {
            id: ShowId::generate()?,
            user_id: user.user_id.clone(),
            title,
            created_at: now,
        })
        .await?;

    record_show_event(ShowEvent::Started);
    info!(user = %user.user_id, show = %show.id, "show started");
    Ok(HttpResponse::Created().json(ShowResponse::from(show)))
}

pub async fn active_show_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let show = state
        .storage()
        .active_show(&user.user_id)
        .await?
        .ok_or(ApiError::NotFound("active show"))?;
    Ok(HttpResponse::Ok().json(ShowResponse::from(show)))
}

pub async fn end_show_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let show = owned_show(&state, &user, &path.into_inner()).await?;
    if !show.active {
        record_show_event(ShowEvent::AlreadyEnded);
        return Ok(HttpResponse::Ok().json(ShowResponse::from(show)));
    }

    let ended = state
        .storage()
        .end_show(&show.id, Utc::now())
        .await?
        .ok_or(ApiError::NotFound("show"))?;
    record_show_event(ShowEvent::Ended);
    info!(
        user = %user.user_id,
        show = %ended.id,
        total_earnings = ended.total_earnings.unwrap_or(0),
        "show ended"
    );
    Ok(HttpResponse::Ok().json(ShowResponse::from(ended)))
}

pub async fn public_show_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let show_id = ShowId::parse(&path.into_inner())?;
    let show = state
        .storage()
        .find_show(&show_id)
        .await?
        .filter(|show| show.active)
        .ok_or(ApiError::NotFound("show"))?;

    let settings = state.storage().find_settings(&show.user_id).await?;
    let owner = state.storage().find_user(&show.user_id).await?;
    let banned_words = state.storage().banned_words(&show.user_id).await?;

    let dj_name = settings
        .as_ref()
        .and_then(|s| s.artist_name.clone())
        .or_else(|| owner.and_then(|user| user.name))
        .unwrap_or_else(|| FALLBACK_DJ_NAME.to_string());
    let price_per_char = settings
        .as_ref()
        .map_or(DEFAULT_PRICE_PER_CHAR, |s| s.price_per_char);

    Ok(HttpResponse::Ok().json(PublicShowResponse {
        id: show.id.into_inner(),
        title: show.title,
        dj_name,
        price_per_char,
        banned_words,
    }))
}

pub async fn past_shows_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<PastShowsQuery>,
) -> Result<HttpResponse, ApiError> {
    let range = parse_range(&query)?;
    let shows = state.storage().past_shows(&user.user_id, range).await?;
    let body: Vec<PastShowResponse> = shows.into_iter().map(PastShowResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn show_details_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let show = owned_show(&state, &user, &path.into_inner()).await?;
    let messages = state
        .storage()
        .list_messages(&show.id, &MessageQuery::default())
        .await?;

    let total_earnings = total_payments(&messages);
    let paid_message_count = messages.iter().filter(|m| m.payment > 0).count();
    Ok(HttpResponse::Ok().json(ShowDetailsResponse {
        id: show.id.into_inner(),
        title: show.title,
        active: show.active,
        created_at: show.created_at,
        ended_at: show.ended_at,
        message_count: messages.len(),
        paid_message_count,
        total_earnings,
        messages: messages.into_iter().map(MessageResponse::from).collect(),
    }))
}

/// Loads a show and checks that the caller runs it.
async fn owned_show(
    state: &AppState,
    user: &AuthenticatedUser,
    raw_id: &str,
) -> Result<ShowRecord, ApiError> {
    let show_id = ShowId::parse(raw_id)?;
    let show = state
        .storage()
        .find_show(&show_id)
        .await?
        .ok_or(ApiError::NotFound("show"))?;
    if show.user_id != user.user_id {
        return Err(ApiError::Forbidden);
    }
    Ok(show)
}

fn default_title(now: DateTime<Utc>) -> String {
    format!("Show - {}", now.format("%Y-%m-%d %H:%M UTC"))
}

fn parse_range(query: &PastShowsQuery) -> Result<DateRange, ApiError> {
    let from = parse_day(query.start_date.as_deref(), "startDate")?
        .map(|day| Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)));
    let until = parse_day(query.end_date.as_deref(), "endDate")?
        .and_then(|day| day.and_hms_milli_opt(23, 59, 59, 999))
        .map(|end| Utc.from_utc_datetime(&end));

    if let (Some(from), Some(until)) = (from, until) {
        if from > until {
            return Err(ApiError::BadRequest(
                "startDate must not be after endDate".into(),
            ));
        }
    }
    Ok(DateRange { from, until })
}

fn parse_day(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{field} must be YYYY-MM-DD"))),
    }
}
