use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{
    models::{Card, Friend, Transfer},
    services::{CardsApi, FriendsApi, TransfersApi},
};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Could not build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// HTTP client for the finance backend
///
/// Serves all three list endpoints from one base URL. It never retries on
/// its own; retry policy belongs to whoever drives the load.
pub struct FinanceClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl FinanceClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("iACC/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = self.endpoint(path);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthRequired);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimitExceeded);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let items: Vec<T> = serde_json::from_str(&body)?;
        debug!("{} returned {} records", path, items.len());
        Ok(items)
    }
}

#[async_trait]
impl FriendsApi for FinanceClient {
    async fn load_friends(&self) -> Result<Vec<Friend>> {
        self.fetch_list("friends").await
    }
}

#[async_trait]
impl CardsApi for FinanceClient {
    async fn load_cards(&self) -> Result<Vec<Card>> {
        self.fetch_list("cards").await
    }
}

#[async_trait]
impl TransfersApi for FinanceClient {
    async fn load_transfers(&self) -> Result<Vec<Transfer>> {
        self.fetch_list("transfers").await
    }
}
