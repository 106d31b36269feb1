//! VK wall API adapter for fetching community posts

use async_trait::async_trait;
use news_fetcher_domain::{FeedError, FeedPage, FeedSource, WallPost};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Transport-level attempts per fetch; the API error envelope is never retried
const FETCH_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Query parameters for `wall.get`
#[derive(Debug, Clone)]
pub struct VkFeedConfig {
    /// Short name of the community whose wall is fetched
    pub domain: String,
    /// Page size
    pub count: u32,
    pub api_version: String,
    pub filter: String,
}

impl Default for VkFeedConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            count: 50,
            api_version: "5.199".to_string(),
            filter: "all".to_string(),
        }
    }
}

/// Feed source backed by the VK `wall.get` method
pub struct VkFeedSource {
    client: Client,
    base_url: String,
    access_token: SecretString,
    config: VkFeedConfig,
}

impl VkFeedSource {
    pub fn new(access_token: SecretString, config: VkFeedConfig) -> Self {
        Self::with_base_url(access_token, config, "https://api.vk.com".to_string())
    }

    pub fn with_base_url(
        access_token: SecretString,
        config: VkFeedConfig,
        base_url: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            access_token,
            config,
        }
    }

    async fn try_fetch(&self) -> Result<FeedPage, FeedError> {
        let url = format!("{}/method/wall.get", self.base_url);
        let count = self.config.count.to_string();
        let params = [
            ("domain", self.config.domain.as_str()),
            ("count", count.as_str()),
            ("access_token", self.access_token.expose_secret()),
            ("v", self.config.api_version.as_str()),
            ("filter", self.config.filter.as_str()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Network(format!(
                "wall.get returned HTTP {}",
                response.status()
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))?;

        if let Some(error) = raw.get("error") {
            let envelope: ErrorEnvelope = serde_json::from_value(error.clone())
                .map_err(|e| FeedError::Decode(e.to_string()))?;
            return Err(FeedError::Api {
                code: envelope.error_code,
                message: envelope.error_msg,
            });
        }

        let decoded: WallGetResponse = serde_json::from_value(raw.clone())
            .map_err(|e| FeedError::Decode(e.to_string()))?;
        let posts = decoded.response.map(|body| body.items).unwrap_or_default();

        Ok(FeedPage { posts, raw })
    }
}

#[derive(Deserialize)]
struct WallGetResponse {
    response: Option<WallGetBody>,
}

#[derive(Deserialize)]
struct WallGetBody {
    #[serde(default)]
    items: Vec<WallPost>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

#[async_trait]
impl FeedSource for VkFeedSource {
    async fn fetch_page(&self) -> Result<FeedPage, FeedError> {
        tracing::info!(
            domain = %self.config.domain,
            count = self.config.count,
            "Fetching VK wall page"
        );

        let mut last_error = None;
        for attempt in 1..=FETCH_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(RETRY_BACKOFF).await;
            }

            match self.try_fetch().await {
                Ok(page) => {
                    tracing::info!(count = page.posts.len(), "Fetched wall posts");
                    return Ok(page);
                }
                // the API answered; its error envelope is final
                Err(error @ FeedError::Api { .. }) => return Err(error),
                Err(error) => {
                    tracing::warn!(attempt, error = %error, "wall.get attempt failed");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FeedError::Network("no attempts made".to_string())))
    }
}
