//! Startup-time registries.
//!
//! - [`ChainRegistry`] - active chains and their stats endpoints
//! - [`GraphClientFactory`] - per-chain query endpoints by dataset

mod chains;
mod graph;

pub use chains::ChainRegistry;
pub use graph::{GraphClientFactory, QueryClient};
