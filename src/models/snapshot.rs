use chrono::{DateTime, Utc};
use num_bigint::BigInt;

use crate::config::DisplaySettings;
use crate::models::{Chain, MetricKind};
use crate::utils::format_amount;

/// Value reported for one chain in a snapshot.
///
/// `Absent` means no valid data arrived for the chain this cycle and is
/// distinct from a reported zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainValue {
    Present(BigInt),
    Absent,
}

impl ChainValue {
    pub fn is_present(&self) -> bool {
        matches!(self, ChainValue::Present(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    pub chain: Chain,
    pub value: ChainValue,
}

/// Merged point-in-time view of one metric across all chains.
///
/// Entries keep registry order. `total` is always the sum of the present
/// entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub kind: MetricKind,
    pub entries: Vec<ChainEntry>,
    pub total: BigInt,
    pub updated_at: DateTime<Utc>,
}

impl MetricSnapshot {
    pub fn get(&self, chain_id: u64) -> Option<&ChainValue> {
        self.entries
            .iter()
            .find(|e| e.chain.chain_id == chain_id)
            .map(|e| &e.value)
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_present()).count()
    }

    pub fn absent_chains(&self) -> Vec<&Chain> {
        self.entries
            .iter()
            .filter(|e| !e.value.is_present())
            .map(|e| &e.chain)
            .collect()
    }

    /// True when every chain reported a value.
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.value.is_present())
    }

    /// Human readable total using the metric's configured decimals.
    pub fn format_total(&self, display: &DisplaySettings) -> String {
        format_amount(&self.total, display.decimals_for(self.kind), display.precision)
    }
}
