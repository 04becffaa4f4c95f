use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use config::{Config, ConfigError, Environment, File, FileFormat};
use log::LevelFilter;
use serde::Deserialize;
use url::Url;

use crate::models::MetricKind;

/// Per-chain stats and query endpoints.
///
/// Stats endpoints resolve either from an explicit URL per metric or from
/// `stats_base_url` joined with the metric path (`volume`, `fees`, `users`).
/// An explicit URL wins over the base.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChainSettings {
    pub chain_id: u64,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub stats_base_url: Option<Url>,
    #[serde(default)]
    pub volume_url: Option<Url>,
    #[serde(default)]
    pub fees_url: Option<Url>,
    #[serde(default)]
    pub users_url: Option<Url>,
    /// Dataset name (e.g. "stats", "trades") to query endpoint URL
    #[serde(default)]
    pub subgraphs: HashMap<String, Url>,
}

fn default_enabled() -> bool {
    true
}

impl ChainSettings {
    pub fn explicit_url(&self, kind: MetricKind) -> Option<&Url> {
        match kind {
            MetricKind::Volume => self.volume_url.as_ref(),
            MetricKind::Fees => self.fees_url.as_ref(),
            MetricKind::UniqueUsers => self.users_url.as_ref(),
        }
    }
}

/// Remote fetch and revalidation configuration.
///
/// Controls how often each metric subscription re-runs its aggregation and
/// how long the last good payload per URL is kept around for stale serving.
#[derive(Debug, Deserialize, Clone)]
pub struct FetcherSettings {
    #[serde(default = "default_revalidate_interval")]
    pub revalidate_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Last-good payloads kept; must cover every (chain, metric) endpoint
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Drop last-good payloads after this long; kept indefinitely when unset
    #[serde(default)]
    pub stale_ttl_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_revalidate_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    20
}

fn default_cache_capacity() -> u64 {
    1_000
}

fn default_user_agent() -> String {
    format!("chainstats/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            revalidate_interval_secs: default_revalidate_interval(),
            request_timeout_secs: default_request_timeout(),
            cache_capacity: default_cache_capacity(),
            stale_ttl_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

/// Fixed-point decimals used when rendering totals.
///
/// USD amounts are reported with 30 decimals, user counts are plain integers.
#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_usd_decimals")]
    pub volume_decimals: u8,
    #[serde(default = "default_usd_decimals")]
    pub fees_decimals: u8,
    #[serde(default)]
    pub users_decimals: u8,
    #[serde(default = "default_precision")]
    pub precision: u8,
}

fn default_usd_decimals() -> u8 {
    30
}

fn default_precision() -> u8 {
    2
}

impl DisplaySettings {
    pub fn decimals_for(&self, kind: MetricKind) -> u8 {
        match kind {
            MetricKind::Volume => self.volume_decimals,
            MetricKind::Fees => self.fees_decimals,
            MetricKind::UniqueUsers => self.users_decimals,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            volume_decimals: default_usd_decimals(),
            fees_decimals: default_usd_decimals(),
            users_decimals: 0,
            precision: default_precision(),
        }
    }
}

/// Periodic snapshot report job.
#[derive(Debug, Deserialize, Clone)]
pub struct ReportSettings {
    #[serde(default = "default_report_interval")]
    pub interval_secs: u64,
}

fn default_report_interval() -> u64 {
    300
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_report_interval(),
        }
    }
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup, with `CHAINSTATS__*` environment
/// variables layered on top.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub chains: Vec<ChainSettings>,
    #[serde(default)]
    pub fetcher: FetcherSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(Environment::with_prefix("CHAINSTATS").separator("__"))
            .build()?;

        s.try_deserialize::<Self>()?.validated()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("CHAINSTATS").separator("__"))
            .build()?;

        s.try_deserialize::<Self>()?.validated()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// Logger level; `log_level` is checked at load time.
    pub fn log_level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    /// Number of stats endpoints the enabled chains resolve to.
    pub fn endpoint_count(&self) -> u64 {
        let enabled = self.chains.iter().filter(|c| c.enabled).count();
        (enabled * MetricKind::ALL.len()) as u64
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if LevelFilter::from_str(&self.log_level).is_err() {
            return Err(ConfigError::Message(format!(
                "invalid log_level '{}', expected one of off, error, warn, info, debug, trace",
                self.log_level
            )));
        }

        let endpoints = self.endpoint_count();
        if self.fetcher.cache_capacity < endpoints.max(1) {
            return Err(ConfigError::Message(format!(
                "fetcher.cache_capacity {} cannot hold the last good payload of {} endpoint(s)",
                self.fetcher.cache_capacity, endpoints
            )));
        }

        Ok(self)
    }
}
