use std::collections::HashMap;

use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::config::{ChainSettings, Settings};
use crate::error::{NetworkError, Result, StatsError};
use crate::fetcher::build_http_client;
use crate::models::Chain;

/// Query endpoints per (chain, dataset), built once at startup.
///
/// Consumers hold this by reference and ask it for a [`QueryClient`]; a chain
/// or dataset without an endpoint is a recoverable
/// [`StatsError::UnsupportedChain`], letting the caller switch that feature
/// off for the chain.
#[derive(Debug, Clone)]
pub struct GraphClientFactory {
    http: Client,
    endpoints: HashMap<(u64, String), Url>,
}

impl GraphClientFactory {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = build_http_client(&settings.fetcher)?;
        let factory = Self::new(http, &settings.chains);

        info!("Registered {} query endpoint(s)", factory.endpoints.len());
        Ok(factory)
    }

    /// Register the query endpoints of every enabled chain.
    pub fn new(http: Client, chains: &[ChainSettings]) -> Self {
        let endpoints = chains
            .iter()
            .filter(|c| c.enabled)
            .flat_map(|c| {
                c.subgraphs
                    .iter()
                    .map(move |(dataset, url)| ((c.chain_id, dataset.clone()), url.clone()))
            })
            .collect();

        Self { http, endpoints }
    }

    pub fn client_for(&self, chain: &Chain, dataset: &str) -> Result<QueryClient> {
        let url = self
            .endpoints
            .get(&(chain.chain_id, dataset.to_string()))
            .ok_or_else(|| StatsError::UnsupportedChain {
                chain: chain.to_string(),
                dataset: dataset.to_string(),
            })?;

        Ok(QueryClient {
            chain: chain.clone(),
            dataset: dataset.to_string(),
            url: url.clone(),
            http: self.http.clone(),
        })
    }

    pub fn supports(&self, chain: &Chain, dataset: &str) -> bool {
        self.endpoints
            .contains_key(&(chain.chain_id, dataset.to_string()))
    }

    /// Datasets available for `chain`, sorted by name.
    pub fn datasets(&self, chain: &Chain) -> Vec<&str> {
        let mut datasets: Vec<&str> = self
            .endpoints
            .keys()
            .filter(|(chain_id, _)| *chain_id == chain.chain_id)
            .map(|(_, dataset)| dataset.as_str())
            .collect();
        datasets.sort_unstable();
        datasets
    }
}

/// Handle to one chain's query endpoint for one dataset.
#[derive(Debug, Clone)]
pub struct QueryClient {
    chain: Chain,
    dataset: String,
    url: Url,
    http: Client,
}

#[derive(Deserialize)]
struct QueryResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<QueryError>,
}

#[derive(Deserialize)]
struct QueryError {
    message: String,
}

impl QueryClient {
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Run a GraphQL query and deserialize its `data` member.
    pub async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        debug!("Querying {} {} at {}", self.chain, self.dataset, self.url);

        let response = self
            .http
            .post(self.url.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(NetworkError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetworkError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body: QueryResponse<T> = response.json().await.map_err(NetworkError::from)?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(StatsError::Query(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| StatsError::Query(format!("{} returned no data", self.url)))
    }
}
