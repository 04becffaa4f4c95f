use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::FetcherSettings;
use crate::error::{NetworkError, Result, StatsError};

/// Raw JSON retrieval for a single URL.
///
/// The fetcher only talks to the network through this trait so the HTTP
/// client can be swapped out in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &Url) -> Result<Value, NetworkError>;
}

/// Build the shared HTTP client used for stats and query endpoints.
pub fn build_http_client(settings: &FetcherSettings) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .user_agent(settings.user_agent.clone())
        .build()
        .map_err(|e| StatsError::Config(format!("failed to build HTTP client: {}", e)))
}

/// [`Transport`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_settings(settings: &FetcherSettings) -> Result<Self> {
        Ok(Self::new(build_http_client(settings)?))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, NetworkError> {
        debug!("GET {}", url);

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| NetworkError::Decode(e.to_string()))
    }
}
