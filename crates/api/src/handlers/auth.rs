use actix_web::{http::header, web, HttpResponse};
use hearme_domain::model::UserId;
use hearme_domain::storage::{SettingsStore, UserStore};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{removal_cookie, session_cookie, AuthError, AuthenticatedUser};
use crate::state::AppState;

use super::settings::SettingsBody;
use super::ApiError;

#[derive(Debug, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: SessionUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub settings: Option<SettingsBody>,
}

pub async fn sign_in_handler(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let csrf_state = state.sessions().begin_sign_in()?;
    let location = state.identity().authorize_url(&csrf_state)?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish())
}

pub async fn callback_handler(
    state: web::Data<AppState>,
    query: web::Query<CallbackQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    if let Some(reason) = query.error {
        counter!("api_sign_ins_total", "result" => "denied").increment(1);
        return Err(AuthError::Denied(reason).into());
    }
    let csrf_state = query.state.ok_or(AuthError::InvalidState)?;
    if !state.sessions().complete_sign_in(&csrf_state) {
        counter!("api_sign_ins_total", "result" => "invalid_state").increment(1);
        return Err(AuthError::InvalidState.into());
    }
    let code = query
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing authorization code".into()))?;

    let profile = state.identity().exchange_code(&code).await.inspect_err(|err| {
        counter!("api_sign_ins_total", "result" => "provider_error").increment(1);
        warn!(error = %err, "authorization code exchange failed");
    })?;
    let user = state
        .storage()
        .upsert_user(profile, UserId::generate()?)
        .await?;
    let token = state.sessions().issue(user.id.clone())?;

    counter!("api_sign_ins_total", "result" => "success").increment(1);
    info!(user = %user.id, "dj signed in");
    Ok(HttpResponse::Found()
        .cookie(session_cookie(token, state.auth().cookie_secure))
        .insert_header((
            header::LOCATION,
            format!("{}/dashboard", state.auth().public_base_url),
        ))
        .finish())
}

pub async fn sign_out_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> HttpResponse {
    state.sessions().revoke(&user.token);
    HttpResponse::NoContent().cookie(removal_cookie()).finish()
}

pub async fn session_handler(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    // A session can outlive its user row when the database was reset.
    let record = state
        .storage()
        .find_user(&user.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    let settings = state.storage().find_settings(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(SessionResponse {
        user: SessionUser {
            id: record.id.into_inner(),
            name: record.name,
            email: record.email,
            settings: settings.map(SettingsBody::from),
        },
    }))
}
