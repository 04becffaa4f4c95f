//! Folds per-chain results into a [`MetricSnapshot`].

use chrono::{DateTime, Utc};
use log::warn;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::StatsError;
use crate::models::{ChainEntry, ChainValue, MetricKind, MetricPayload, MetricSnapshot};
use crate::worker::ChainResult;

/// Merge raw per-chain results for `kind` into one snapshot.
///
/// Pure: the output depends only on the arguments. Chains keep input order.
/// A missing or malformed payload becomes [`ChainValue::Absent`] and adds
/// nothing to the total; parse failures are logged.
pub fn reduce(
    kind: MetricKind,
    results: &[ChainResult],
    updated_at: DateTime<Utc>,
) -> MetricSnapshot {
    let mut total = BigInt::zero();
    let mut entries = Vec::with_capacity(results.len());

    for (chain, raw) in results {
        let value = match raw {
            Some(payload) => match MetricPayload::parse(kind, payload) {
                Ok(parsed) => {
                    let amount = parsed.into_amount();
                    total += &amount;
                    ChainValue::Present(amount)
                },
                Err(source) => {
                    warn!(
                        "{}",
                        StatsError::Parse {
                            chain: chain.to_string(),
                            source,
                        }
                    );
                    ChainValue::Absent
                },
            },
            None => ChainValue::Absent,
        };

        entries.push(ChainEntry {
            chain: chain.clone(),
            value,
        });
    }

    MetricSnapshot {
        kind,
        entries,
        total,
        updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chain;
    use serde_json::{json, Value};
    use std::str::FromStr;
    use std::sync::Arc;

    fn present(body: Value) -> Option<Arc<Value>> {
        Some(Arc::new(body))
    }

    fn chain(id: u64, name: &str) -> Chain {
        Chain::new(id, name)
    }

    #[test]
    fn test_partial_results_example() {
        let results = vec![
            (chain(1, "A"), present(json!({ "totalVolume": "100" }))),
            (chain(2, "B"), None),
            (chain(3, "C"), present(json!({ "totalVolume": "50" }))),
        ];

        let snapshot = reduce(MetricKind::Volume, &results, Utc::now());

        assert_eq!(snapshot.get(1), Some(&ChainValue::Present(BigInt::from(100))));
        assert_eq!(snapshot.get(2), Some(&ChainValue::Absent));
        assert_eq!(snapshot.get(3), Some(&ChainValue::Present(BigInt::from(50))));
        assert_eq!(snapshot.total, BigInt::from(150));
        assert_eq!(snapshot.present_count(), 2);
        assert!(!snapshot.is_complete());
        assert_eq!(snapshot.absent_chains(), vec![&chain(2, "B")]);
    }

    #[test]
    fn test_empty_input() {
        let snapshot = reduce(MetricKind::Fees, &[], Utc::now());

        assert!(snapshot.total.is_zero());
        assert!(snapshot.entries.is_empty());
        assert!(snapshot.is_complete());
    }

    #[test]
    fn test_reduce_is_idempotent() {
        let results = vec![
            (chain(42161, "arbitrum"), present(json!({ "totalFees": "999999999999999999999999" }))),
            (chain(43114, "avalanche"), present(json!({ "totalFees": "garbage" }))),
            (chain(10, "optimism"), None),
        ];
        let at = Utc::now();

        let first = reduce(MetricKind::Fees, &results, at);
        let second = reduce(MetricKind::Fees, &results, at);

        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_payload_is_absent() {
        let results = vec![
            (chain(1, "A"), present(json!({ "totalUniqueUsers": 10 }))),
            (chain(2, "B"), present(json!({ "totalUniqueUsers": "ten" }))),
            (chain(3, "C"), present(json!("not an object"))),
        ];

        let snapshot = reduce(MetricKind::UniqueUsers, &results, Utc::now());

        assert_eq!(snapshot.get(2), Some(&ChainValue::Absent));
        assert_eq!(snapshot.get(3), Some(&ChainValue::Absent));
        assert_eq!(snapshot.total, BigInt::from(10));
    }

    #[test]
    fn test_empty_data_counts_as_zero_not_absent() {
        let results = vec![
            (chain(1, "A"), present(Value::Null)),
            (chain(2, "B"), present(json!([]))),
            (chain(3, "C"), present(json!({ "totalVolume": "5" }))),
        ];

        let snapshot = reduce(MetricKind::Volume, &results, Utc::now());

        assert_eq!(snapshot.get(1), Some(&ChainValue::Present(BigInt::zero())));
        assert_eq!(snapshot.get(2), Some(&ChainValue::Present(BigInt::zero())));
        assert_eq!(snapshot.total, BigInt::from(5));
        assert!(snapshot.is_complete());
    }

    #[test]
    fn test_total_exceeds_u128() {
        let big = "300000000000000000000000000000000000000"; // ~ 0.88 * u128::MAX
        let results = vec![
            (chain(1, "A"), present(json!({ "totalVolume": big }))),
            (chain(2, "B"), present(json!({ "totalVolume": big }))),
        ];

        let snapshot = reduce(MetricKind::Volume, &results, Utc::now());

        let expected = BigInt::from_str(big).unwrap() * 2;
        assert_eq!(snapshot.total, expected);
        assert!(snapshot.total > BigInt::from(u128::MAX));
    }

    #[test]
    fn test_order_follows_input() {
        let results = vec![
            (chain(3, "C"), present(json!({ "totalVolume": "1" }))),
            (chain(1, "A"), None),
            (chain(2, "B"), present(json!({ "totalVolume": "2" }))),
        ];

        let snapshot = reduce(MetricKind::Volume, &results, Utc::now());
        let ids: Vec<u64> = snapshot.entries.iter().map(|e| e.chain.chain_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
