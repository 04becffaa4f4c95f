use std::fmt;

use serde::{Deserialize, Serialize};

/// A blockchain network the platform reports stats for.
///
/// Loaded from configuration at startup and never mutated afterwards.
/// `name` is the symbolic identifier used in logs and config keys,
/// `chain_id` the numeric EVM chain id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chain {
    pub chain_id: u64,
    pub name: String,
}

impl Chain {
    pub fn new(chain_id: u64, name: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}
