mod chain;
mod metric;
mod snapshot;

pub use chain::Chain;
pub use metric::{FeesResult, MetricKind, MetricPayload, UserCountResult, VolumeResult};
pub use snapshot::{ChainEntry, ChainValue, MetricSnapshot};
