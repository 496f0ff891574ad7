use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use hearme_domain::model::{DjSettings, SettingsUpdate, DEFAULT_PRICE_PER_CHAR};
use hearme_domain::storage::{BannedWordStore, SettingsStore};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::state::AppState;

use super::ApiError;

/// Wire form of a DJ's settings. Prices are in cents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsBody {
    pub artist_name: Option<String>,
    pub price_per_char: i64,
    pub star_price: i64,
    pub kiss_price: i64,
    pub heart_price: i64,
    pub auto_moderate: bool,
    pub payout_email: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<DjSettings> for SettingsBody {
    fn from(value: DjSettings) -> Self {
        Self {
            artist_name: value.artist_name,
            price_per_char: value.price_per_char,
            star_price: value.star_price,
            kiss_price: value.kiss_price,
            heart_price: value.heart_price,
            auto_moderate: value.auto_moderate,
            payout_email: value.payout_email,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub artist_name: Option<String>,
    #[serde(default = "default_price_per_char")]
    pub price_per_char: i64,
    #[serde(default)]
    pub star_price: i64,
    #[serde(default)]
    pub kiss_price: i64,
    #[serde(default)]
    pub heart_price: i64,
    #[serde(default)]
    pub auto_moderate: bool,
    pub payout_email: Option<String>,
}

fn default_price_per_char() -> i64 {
    DEFAULT_PRICE_PER_CHAR
}

/// `{}` when the DJ never saved settings.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StoredSettings {
    Saved(SettingsBody),
    Empty {},
}

#[derive(Debug, Serialize)]
pub struct SettingsEnvelope {
    pub settings: StoredSettings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateSettingsResponse {
    pub success: bool,
    pub settings: SettingsBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BannedWordsBody {
    #[serde(default)]
    pub words: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceBannedWordsResponse {
    pub success: bool,
    pub banned_words: Vec<String>,
}

pub async fn get_settings_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let settings = match state.storage().find_settings(&user.user_id).await? {
        Some(settings) => StoredSettings::Saved(settings.into()),
        None => StoredSettings::Empty {},
    };
    Ok(HttpResponse::Ok().json(SettingsEnvelope { settings }))
}

pub async fn update_settings_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateSettingsRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let prices = [
        ("pricePerChar", payload.price_per_char),
        ("starPrice", payload.star_price),
        ("kissPrice", payload.kiss_price),
        ("heartPrice", payload.heart_price),
    ];
    if let Some((field, _)) = prices.iter().find(|(_, price)| *price < 0) {
        return Err(ApiError::BadRequest(format!("{field} must not be negative")));
    }
    let payout_email = normalize_optional(payload.payout_email);
    if payout_email.as_deref().is_some_and(|email| !email.contains('@')) {
        return Err(ApiError::BadRequest("payoutEmail is not an email address".into()));
    }

    let saved = state
        .storage()
        .upsert_settings(SettingsUpdate {
            user_id: user.user_id.clone(),
            artist_name: normalize_optional(payload.artist_name),
            price_per_char: payload.price_per_char,
            star_price: payload.star_price,
            kiss_price: payload.kiss_price,
            heart_price: payload.heart_price,
            auto_moderate: payload.auto_moderate,
            payout_email,
        })
        .await?;

    counter!("api_settings_updates_total", "kind" => "settings").increment(1);
    info!(user = %user.user_id, price_per_char = saved.price_per_char, "settings saved");
    Ok(HttpResponse::Ok().json(UpdateSettingsResponse {
        success: true,
        settings: saved.into(),
    }))
}

pub async fn get_banned_words_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let words = state.storage().banned_words(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(BannedWordsBody { words }))
}

pub async fn replace_banned_words_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    payload: web::Json<BannedWordsBody>,
) -> Result<HttpResponse, ApiError> {
    let banned_words = state
        .storage()
        .replace_banned_words(&user.user_id, payload.into_inner().words)
        .await?;

    counter!("api_settings_updates_total", "kind" => "banned_words").increment(1);
    info!(user = %user.user_id, count = banned_words.len(), "banned words replaced");
    Ok(HttpResponse::Ok().json(ReplaceBannedWordsResponse {
        success: true,
        banned_words,
    }))
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
