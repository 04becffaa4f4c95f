pub mod config;
pub mod cron;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod registry;
pub mod utils;
pub mod worker;

pub use config::Settings;
pub use cron::{CronScheduler, CronSettings};
pub use error::{NetworkError, ParseError, StatsError};
pub use fetcher::{HttpTransport, RemoteFetcher, Transport};
pub use models::{Chain, ChainValue, MetricKind, MetricSnapshot};
pub use registry::{ChainRegistry, GraphClientFactory, QueryClient};
pub use worker::{reduce, MetricSubscription, PerChainAggregator, StatsHub};
