use std::collections::{HashMap, HashSet};

use log::info;
use url::Url;

use crate::config::{ChainSettings, Settings};
use crate::error::{Result, StatsError};
use crate::models::{Chain, MetricKind};

/// Static list of supported chains and their stats endpoints.
///
/// Built once at startup. Construction fails if any active chain is missing
/// an endpoint for any metric, so lookups afterwards only fail for chains the
/// registry never knew about.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<Chain>,
    endpoints: HashMap<(u64, MetricKind), Url>,
}

impl ChainRegistry {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let registry = Self::from_chain_settings(&settings.chains)?;

        info!(
            "Loaded {} active chain(s): {}",
            registry.chains.len(),
            registry
                .chains
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(registry)
    }

    /// Build the registry from chain configuration, skipping disabled chains.
    pub fn from_chain_settings(configs: &[ChainSettings]) -> Result<Self> {
        let mut chains = Vec::new();
        let mut endpoints = HashMap::new();

        for config in configs.iter().filter(|c| c.enabled) {
            let chain = Chain::new(config.chain_id, config.name.clone());

            for kind in MetricKind::ALL {
                endpoints.insert((chain.chain_id, kind), resolve_endpoint(config, kind)?);
            }

            chains.push(chain);
        }

        Self::new(chains, endpoints)
    }

    /// Build the registry from an explicit chain list and endpoint table.
    ///
    /// Chain order is preserved and becomes the order of every snapshot.
    pub fn new(chains: Vec<Chain>, endpoints: HashMap<(u64, MetricKind), Url>) -> Result<Self> {
        if chains.is_empty() {
            return Err(StatsError::Config("no enabled chains configured".to_string()));
        }

        let mut seen = HashSet::new();
        for chain in &chains {
            if !seen.insert(chain.chain_id) {
                return Err(StatsError::Config(format!(
                    "chain id {} is configured more than once",
                    chain.chain_id
                )));
            }

            for kind in MetricKind::ALL {
                if !endpoints.contains_key(&(chain.chain_id, kind)) {
                    return Err(StatsError::Config(format!(
                        "chain {} has no {} endpoint",
                        chain, kind
                    )));
                }
            }
        }

        Ok(Self { chains, endpoints })
    }

    pub fn list_active_chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn get(&self, chain_id: u64) -> Option<&Chain> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    pub fn endpoint_for(&self, chain: &Chain, kind: MetricKind) -> Result<&Url> {
        self.endpoints
            .get(&(chain.chain_id, kind))
            .ok_or_else(|| StatsError::Config(format!("chain {} has no {} endpoint", chain, kind)))
    }
}

fn resolve_endpoint(config: &ChainSettings, kind: MetricKind) -> Result<Url> {
    if let Some(url) = config.explicit_url(kind) {
        return Ok(url.clone());
    }

    let base = config.stats_base_url.as_ref().ok_or_else(|| {
        StatsError::Config(format!(
            "chain {} ({}) has neither {}_url nor stats_base_url",
            config.name,
            config.chain_id,
            kind.path()
        ))
    })?;

    // Url::join would replace the last path segment of a base without a trailing slash
    let mut endpoint = base.clone();
    endpoint
        .path_segments_mut()
        .map_err(|_| {
            StatsError::Config(format!(
                "stats_base_url {} of chain {} ({}) cannot take a path",
                base, config.name, config.chain_id
            ))
        })?
        .pop_if_empty()
        .push(kind.path());

    Ok(endpoint)
}
