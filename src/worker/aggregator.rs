use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;

use crate::error::Result;
use crate::fetcher::RemoteFetcher;
use crate::models::{Chain, MetricKind};
use crate::registry::ChainRegistry;

/// Decoded payload for one chain, `None` when nothing usable arrived.
pub type RawChainResult = Option<Arc<Value>>;

pub type ChainResult = (Chain, RawChainResult);

/// Fans one metric request out across every active chain.
#[derive(Clone)]
pub struct PerChainAggregator {
    registry: Arc<ChainRegistry>,
    fetcher: RemoteFetcher,
}

impl PerChainAggregator {
    pub fn new(registry: Arc<ChainRegistry>, fetcher: RemoteFetcher) -> Self {
        Self { registry, fetcher }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Fetch `kind` from every active chain concurrently.
    ///
    /// Resolves once every chain has either answered or been marked absent.
    /// Results follow registry order, not completion order. Endpoints are
    /// resolved before anything is sent, so a configuration error fails the
    /// run without issuing any request.
    pub async fn aggregate(&self, kind: MetricKind) -> Result<Vec<ChainResult>> {
        let requests = self
            .registry
            .list_active_chains()
            .iter()
            .map(|chain| -> Result<_> {
                let url = self.registry.endpoint_for(chain, kind)?;
                Ok(async move { (chain.clone(), self.fetcher.fetch(url).await) })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(join_all(requests).await)
    }
}
