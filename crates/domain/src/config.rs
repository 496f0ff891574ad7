//! Environment-driven configuration structures shared by all binaries.

use std::{env, time::Duration};

use thiserror::Error;

use crate::model::{IdFormatError, ShowId};

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;
/// Upper bound for `SESSION_TTL_SECS`: one year.
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;
const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

/// API configuration: HTTP bind, database, session and identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    database_url: String,
    api_bind_address: String,
    api_unix_socket: Option<String>,
    public_base_url: String,
    session_ttl: Duration,
    cookie_secure: bool,
    oauth: OAuthConfig,
}

impl ApiConfig {
    /// Loads only the environment variables required by the API binary.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let public_base_url = get_optional_var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let session_ttl = match get_optional_var("SESSION_TTL_SECS") {
            Some(raw) => raw.parse().map_err(|source| ConfigError::InvalidNumber {
                key: "SESSION_TTL_SECS",
                source,
            })?,
            None => DEFAULT_SESSION_TTL_SECS,
        };
        if session_ttl > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::OutOfRange {
                key: "SESSION_TTL_SECS",
                value: session_ttl,
                max: MAX_SESSION_TTL_SECS,
            });
        }
        let cookie_secure = parse_bool_var("COOKIE_SECURE")?.unwrap_or(false);
        let oauth = OAuthConfig {
            client_id: get_required_var("OAUTH_CLIENT_ID")?,
            client_secret: get_required_var("OAUTH_CLIENT_SECRET")?,
            authorize_url: get_optional_var("OAUTH_AUTHORIZE_URL")
                .unwrap_or_else(|| GOOGLE_AUTHORIZE_URL.to_string()),
            token_url: get_optional_var("OAUTH_TOKEN_URL")
                .unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
            userinfo_url: get_optional_var("OAUTH_USERINFO_URL")
                .unwrap_or_else(|| GOOGLE_USERINFO_URL.to_string()),
            redirect_url: format!("{public_base_url}/api/auth/callback"),
        };

        Ok(Self {
            database_url: get_required_var("DATABASE_URL")?,
            api_bind_address: get_required_var("API_BIND_ADDRESS")?,
            api_unix_socket: get_optional_var("API_UNIX_SOCKET"),
            public_base_url,
            session_ttl: Duration::from_secs(session_ttl.max(1)),
            cookie_secure,
            oauth,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn api_bind_address(&self) -> &str {
        &self.api_bind_address
    }

    pub fn api_unix_socket(&self) -> Option<&str> {
        self.api_unix_socket.as_deref()
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    pub fn oauth(&self) -> &OAuthConfig {
        &self.oauth
    }
}

/// OAuth2 authorization-code client settings. Endpoints default to Google.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub redirect_url: String,
}

/// Settings for the terminal live-feed client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    api_url: String,
    show_id: ShowId,
    poll_interval: Duration,
    paid_only: bool,
}

impl FeedConfig {
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let api_url = get_required_var("FEED_API_URL")?
            .trim_end_matches('/')
            .to_string();
        let show_id = ShowId::parse(&get_required_var("FEED_SHOW_ID")?).map_err(|source| {
            ConfigError::InvalidId {
                key: "FEED_SHOW_ID",
                source,
            }
        })?;
        let poll_interval_ms = match get_optional_var("FEED_POLL_INTERVAL_MS") {
            Some(raw) => raw.parse().map_err(|source| ConfigError::InvalidNumber {
                key: "FEED_POLL_INTERVAL_MS",
                source,
            })?,
            None => DEFAULT_POLL_INTERVAL_MS,
        };

        Ok(Self {
            api_url,
            show_id,
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
            paid_only: parse_bool_var("FEED_PAID_ONLY")?.unwrap_or(false),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn show_id(&self) -> &ShowId {
        &self.show_id
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn paid_only(&self) -> bool {
        self.paid_only
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    get_optional_var(key).ok_or(ConfigError::MissingVar { key })
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_bool_var(key: &'static str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = get_optional_var(key) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidBool { key, value: raw }),
    }
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("HEARME_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid integer in `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("`{key}` is {value}, above the maximum of {max}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        max: u64,
    },
    #[error("invalid boolean in `{key}`: `{value}`")]
    InvalidBool { key: &'static str, value: String },
    #[error("invalid identifier in `{key}`: {source}")]
    InvalidId {
        key: &'static str,
        #[source]
        source: IdFormatError,
    },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_GUARD: Mutex<()> = Mutex::new(());

    const API_KEYS: &[&str] = &[
        "API_UNIX_SOCKET",
        "PUBLIC_BASE_URL",
        "SESSION_TTL_SECS",
        "COOKIE_SECURE",
        "OAUTH_AUTHORIZE_URL",
        "OAUTH_TOKEN_URL",
        "OAUTH_USERINFO_URL",
        "FEED_POLL_INTERVAL_MS",
        "FEED_PAID_ONLY",
    ];

    fn set_env() {
        std::env::set_var("HEARME_SKIP_DOTENV", "1");
        std::env::set_var("DATABASE_URL", "sqlite://test.db");
        std::env::set_var("API_BIND_ADDRESS", "127.0.0.1:8080");
        std::env::set_var("OAUTH_CLIENT_ID", "client-id");
        std::env::set_var("OAUTH_CLIENT_SECRET", "client-secret");
        std::env::set_var("FEED_API_URL", "http://localhost:8080/");
        std::env::set_var("FEED_SHOW_ID", "0123456789abcdef0123456789abcdef");
        for key in API_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn api_config_applies_defaults() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();

        let config = ApiConfig::load_from_env().expect("api config loads");
        assert_eq!(config.database_url(), "sqlite://test.db");
        assert_eq!(config.api_bind_address(), "127.0.0.1:8080");
        assert_eq!(config.public_base_url(), "http://localhost:3000");
        assert_eq!(
            config.session_ttl(),
            Duration::from_secs(DEFAULT_SESSION_TTL_SECS)
        );
        assert!(!config.cookie_secure());
        assert_eq!(config.oauth().token_url, GOOGLE_TOKEN_URL);
        assert_eq!(
            config.oauth().redirect_url,
            "http://localhost:3000/api/auth/callback"
        );
    }

    #[test]
    fn api_config_reads_overrides() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("PUBLIC_BASE_URL", "https://hearme.example/");
        std::env::set_var("SESSION_TTL_SECS", "120");
        std::env::set_var("COOKIE_SECURE", "true");
        std::env::set_var("API_UNIX_SOCKET", "/tmp/hearme.sock");

        let config = ApiConfig::load_from_env().expect("config loads");
        assert_eq!(config.public_base_url(), "https://hearme.example");
        assert_eq!(config.session_ttl(), Duration::from_secs(120));
        assert!(config.cookie_secure());
        assert_eq!(config.api_unix_socket(), Some("/tmp/hearme.sock"));
        assert_eq!(
            config.oauth().redirect_url,
            "https://hearme.example/api/auth/callback"
        );

        set_env();
    }

    #[test]
    fn required_env_vars_are_trimmed() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("DATABASE_URL", "  sqlite://trim.db  ");
        std::env::set_var("API_BIND_ADDRESS", " 127.0.0.1:8081 ");

        let config = ApiConfig::load_from_env().expect("config loads");
        assert_eq!(config.database_url(), "sqlite://trim.db");
        assert_eq!(config.api_bind_address(), "127.0.0.1:8081");

        set_env();
    }

    #[test]
    fn empty_required_env_var_is_treated_as_missing() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("OAUTH_CLIENT_SECRET", "   ");

        let err = ApiConfig::load_from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                key: "OAUTH_CLIENT_SECRET"
            }
        ));

        set_env();
    }

    #[test]
    fn malformed_bool_is_rejected() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("COOKIE_SECURE", "maybe");

        let err = ApiConfig::load_from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBool { key: "COOKIE_SECURE", .. }));

        set_env();
    }

    #[test]
    fn oversized_session_ttl_is_rejected() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("SESSION_TTL_SECS", "100000000000");

        let err = ApiConfig::load_from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                key: "SESSION_TTL_SECS",
                value: 100_000_000_000,
                max: MAX_SESSION_TTL_SECS,
            }
        ));

        std::env::set_var("SESSION_TTL_SECS", MAX_SESSION_TTL_SECS.to_string());
        let config = ApiConfig::load_from_env().expect("maximum ttl is accepted");
        assert_eq!(config.session_ttl(), Duration::from_secs(MAX_SESSION_TTL_SECS));

        set_env();
    }

    #[test]
    fn feed_config_reads_env() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("FEED_POLL_INTERVAL_MS", "500");
        std::env::set_var("FEED_PAID_ONLY", "yes");

        let config = FeedConfig::load_from_env().expect("feed config loads");
        assert_eq!(config.api_url(), "http://localhost:8080");
        assert_eq!(config.show_id().as_str(), "0123456789abcdef0123456789abcdef");
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert!(config.paid_only());

        set_env();
    }

    #[test]
    fn feed_config_rejects_bad_show_id() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("FEED_SHOW_ID", "not-a-show");

        let err = FeedConfig::load_from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidId { key: "FEED_SHOW_ID", .. }));

        set_env();
    }
}
