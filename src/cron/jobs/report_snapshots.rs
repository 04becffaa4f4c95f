//! Job to log the latest snapshot of every metric.
//!
//! Gives operators a periodic one-line-per-metric view of totals and of the
//! chains currently reporting no data.

use anyhow::Result;
use log::{info, warn};

use crate::config::DisplaySettings;
use crate::models::MetricSnapshot;
use crate::worker::SnapshotReader;

/// Logs formatted totals for each metric.
///
/// Metrics without a first snapshot yet are reported as loading.
pub async fn run(reader: &SnapshotReader, display: &DisplaySettings) -> Result<()> {
    let start = std::time::Instant::now();

    let mut incomplete = 0;
    for (kind, snapshot) in reader.snapshots() {
        match snapshot {
            Some(snapshot) => {
                if !snapshot.is_complete() {
                    incomplete += 1;
                    warn!("{}", render(&snapshot, display));
                } else {
                    info!("{}", render(&snapshot, display));
                }
            },
            None => info!("{}: loading", kind),
        }
    }

    info!(
        "Completed report_snapshots job in {:?} ({} metric(s) with missing chains)",
        start.elapsed(),
        incomplete
    );
    Ok(())
}

/// One report line, e.g. `volume: 1,234.50 (2/3 chains, unavailable: avalanche (43114))`.
pub fn render(snapshot: &MetricSnapshot, display: &DisplaySettings) -> String {
    let mut line = format!(
        "{}: {} ({}/{} chains",
        snapshot.kind,
        snapshot.format_total(display),
        snapshot.present_count(),
        snapshot.entries.len()
    );

    let absent = snapshot.absent_chains();
    if !absent.is_empty() {
        let names: Vec<String> = absent.iter().map(|c| c.to_string()).collect();
        line.push_str(", unavailable: ");
        line.push_str(&names.join(", "));
    }
    line.push(')');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chain, ChainEntry, ChainValue, MetricKind};
    use crate::utils::parse_bigint;
    use chrono::Utc;
    use num_bigint::BigInt;

    #[test]
    fn test_render_partial_snapshot() {
        let value = parse_bigint("1234500000000000000000000000000000").unwrap(); // 1,234.5 USD
        let snapshot = MetricSnapshot {
            kind: MetricKind::Volume,
            entries: vec![
                ChainEntry {
                    chain: Chain::new(42161, "arbitrum"),
                    value: ChainValue::Present(value.clone()),
                },
                ChainEntry {
                    chain: Chain::new(43114, "avalanche"),
                    value: ChainValue::Absent,
                },
            ],
            total: value,
            updated_at: Utc::now(),
        };

        assert_eq!(
            render(&snapshot, &DisplaySettings::default()),
            "volume: 1,234.50 (1/2 chains, unavailable: avalanche (43114))"
        );
    }

    #[test]
    fn test_render_user_count() {
        let snapshot = MetricSnapshot {
            kind: MetricKind::UniqueUsers,
            entries: vec![ChainEntry {
                chain: Chain::new(42161, "arbitrum"),
                value: ChainValue::Present(BigInt::from(15_320)),
            }],
            total: BigInt::from(15_320),
            updated_at: Utc::now(),
        };

        let display = DisplaySettings {
            precision: 0,
            ..DisplaySettings::default()
        };
        assert_eq!(render(&snapshot, &display), "unique_users: 15,320 (1/1 chains)");
    }
}
