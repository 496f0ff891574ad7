use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hearme_domain::model::ShowId;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::worker::FeedError;

/// A message as returned by `GET /api/shows/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMessage {
    pub id: String,
    pub display_name: String,
    pub content: String,
    pub payment: i64,
    #[serde(default)]
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch_messages(&self) -> Result<Vec<FeedMessage>, FeedError>;
}

pub struct HttpMessageSource {
    client: Client,
    url: Url,
}

impl HttpMessageSource {
    pub fn new(api_url: &str, show_id: &ShowId, paid_only: bool) -> Result<Self, FeedError> {
        let base = format!("{}/api/shows/{}/messages", api_url.trim_end_matches('/'), show_id);
        let url = if paid_only {
            Url::parse_with_params(&base, &[("paidOnly", "true")])
        } else {
            Url::parse(&base)
        }
        .map_err(|err| FeedError::InvalidUrl(err.to_string()))?;

        Ok(Self {
            client: Client::new(),
            url,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    async fn fetch_messages(&self) -> Result<Vec<FeedMessage>, FeedError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}
