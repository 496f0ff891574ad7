use std::{path::Path, sync::Arc};

#[cfg(unix)]
use std::fs;

use actix_web::{middleware::Logger, web, App, HttpServer};
use hearme_domain::config::{ApiConfig, ConfigError};
use hearme_domain::services::{
    session::InMemorySessionStore,
    telemetry::{init_telemetry, TelemetryConfig, TelemetryError},
};
use hearme_domain::storage::StorageError;
use hearme_storage::SeaOrmStorage;
use thiserror::Error;
use tracing::info;

use crate::{
    auth::OAuthProvider,
    handlers::{
        active_show_handler, callback_handler, create_show_handler, end_show_handler,
        get_banned_words_handler, get_settings_handler, list_messages_handler, metrics_handler,
        past_shows_handler, public_show_handler, replace_banned_words_handler,
        session_handler, show_details_handler, sign_in_handler, sign_out_handler,
        submit_message_handler, update_settings_handler, ApiError,
    },
    state::{AppState, AuthSettings},
};

pub async fn run() -> Result<(), BootstrapError> {
    let config = ApiConfig::load_from_env()?;
    let telemetry = init_telemetry(&TelemetryConfig::from_env("API"))?;

    let storage = SeaOrmStorage::connect(config.database_url()).await?;
    let sessions = Arc::new(InMemorySessionStore::new(config.session_ttl()));
    let identity = Arc::new(OAuthProvider::new(config.oauth().clone()));
    let state = AppState::new(
        storage,
        sessions,
        identity,
        telemetry,
        AuthSettings {
            public_base_url: config.public_base_url().to_string(),
            cookie_secure: config.cookie_secure(),
        },
    );

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(configure_routes)
    });

    #[cfg(unix)]
    {
        if let Some(socket) = config.api_unix_socket() {
            cleanup_socket(socket)?;
            server = server.bind_uds(socket)?;
            info!(socket, "api listening on unix socket");
        } else {
            server = server.bind(config.api_bind_address())?;
            info!(address = config.api_bind_address(), "api listening");
        }
    }

    #[cfg(not(unix))]
    {
        if let Some(socket) = config.api_unix_socket() {
            return Err(BootstrapError::Io(std::io::Error::other(format!(
                "unix socket '{socket}' requested but this platform does not support it"
            ))));
        }
        server = server.bind(config.api_bind_address())?;
        info!(address = config.api_bind_address(), "api listening");
    }

    server.run().await?;
    Ok(())
}

/// Registers every API route. The literal `/api/shows/active` and
/// `/api/shows/past` paths must come before `/api/shows/{show_id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Extractor failures answer with the same JSON error body as handlers.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(err.to_string()).into()
    }));

    cfg.route("/api/auth/signin", web::get().to(sign_in_handler))
        .route("/api/auth/callback", web::get().to(callback_handler))
        .route("/api/auth/signout", web::post().to(sign_out_handler))
        .route("/api/auth/session", web::get().to(session_handler))
        .route("/api/shows", web::post().to(create_show_handler))
        .route("/api/shows/active", web::get().to(active_show_handler))
        .route("/api/shows/past", web::get().to(past_shows_handler))
        .route("/api/shows/{show_id}", web::get().to(public_show_handler))
        .route("/api/shows/{show_id}", web::put().to(end_show_handler))
        .route(
            "/api/shows/{show_id}/details",
            web::get().to(show_details_handler),
        )
        .route(
            "/api/shows/{show_id}/messages",
            web::get().to(list_messages_handler),
        )
        .route("/api/messages", web::post().to(submit_message_handler))
        .route("/api/settings", web::get().to(get_settings_handler))
        .route("/api/settings", web::post().to(update_settings_handler))
        .route(
            "/api/settings/banned-words",
            web::get().to(get_banned_words_handler),
        )
        .route(
            "/api/settings/banned-words",
            web::post().to(replace_banned_words_handler),
        )
        .route("/metrics", web::get().to(metrics_handler));
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Removes a socket file left behind by an unclean shutdown.
#[cfg(unix)]
fn cleanup_socket(path: &str) -> std::io::Result<()> {
    let socket_path = Path::new(path);
    if socket_path.exists() {
        fs::remove_file(socket_path)?;
    }
    Ok(())
}

#[cfg(not(unix))]
#[allow(dead_code)]
fn cleanup_socket(_path: &str) -> std::io::Result<()> {
    Ok(())
}
