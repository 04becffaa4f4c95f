//! Utility functions for the stats layer.
//!
//! - [`conversion`] - BigInt parsing and fixed-point display formatting

mod conversion;

pub use conversion::{format_amount, parse_bigint, to_decimal};
