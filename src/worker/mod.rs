pub mod aggregator;
pub mod reducer;
pub mod subscription;

pub use aggregator::{ChainResult, PerChainAggregator, RawChainResult};
pub use reducer::reduce;
pub use subscription::{MetricSubscription, SnapshotReader, StatsHub};
