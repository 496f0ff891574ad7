use async_trait::async_trait;
use hearme_domain::config::OAuthConfig;
use hearme_domain::model::ProviderProfile;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::AuthError;

const SCOPES: &str = "openid email profile";

/// Seam over the OAuth2 authorization-code flow so tests can swap in a fake.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to, carrying the CSRF `state`.
    fn authorize_url(&self, state: &str) -> Result<String, AuthError>;

    /// Exchanges an authorization code for the signed-in user's profile.
    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, AuthError>;
}

pub struct OAuthProvider {
    config: OAuthConfig,
    client: Client,
}

impl OAuthProvider {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    email: Option<String>,
}

#[async_trait]
impl IdentityProvider for OAuthProvider {
    fn authorize_url(&self, state: &str) -> Result<String, AuthError> {
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|err| AuthError::Provider(err.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, AuthError> {
        let token: TokenResponse = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let info: UserInfo = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(ProviderProfile {
            subject: info.sub,
            name: info.name,
            email: info.email,
        })
    }
}
