use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::models::{MetricKind, MetricSnapshot};
use crate::worker::{reduce, PerChainAggregator};

type SnapshotSlot = Option<Arc<MetricSnapshot>>;

/// Periodic revalidation of one metric.
///
/// Owns a task that aggregates and reduces `kind` every `interval` and
/// publishes the finished snapshot through a watch channel. Consumers only
/// ever see complete snapshots; each one replaces the previous as a whole.
///
/// Dropping the subscription (or calling [`unsubscribe`](Self::unsubscribe))
/// cancels the task. A cycle still in flight at that point is abandoned and
/// its results are never published.
pub struct MetricSubscription {
    kind: MetricKind,
    receiver: watch::Receiver<SnapshotSlot>,
    cancel_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl MetricSubscription {
    pub fn spawn(aggregator: PerChainAggregator, kind: MetricKind, interval: Duration) -> Self {
        Self::spawn_with_token(aggregator, kind, interval, CancellationToken::new())
    }

    /// Like [`spawn`](Self::spawn), stopping as well when `cancel_token` is
    /// cancelled from outside.
    pub fn spawn_with_token(
        aggregator: PerChainAggregator,
        kind: MetricKind,
        interval: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        let (sender, receiver) = watch::channel(None);

        let task_token = cancel_token.clone();
        let handle = tokio::spawn(async move {
            revalidate(aggregator, kind, interval, sender, task_token).await;
        });

        info!("Subscribed to {} (every {:?})", kind, interval);

        Self {
            kind,
            receiver,
            cancel_token,
            handle: Some(handle),
        }
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Most recent finished snapshot, `None` until the first cycle completes.
    pub fn latest(&self) -> Option<Arc<MetricSnapshot>> {
        self.receiver.borrow().clone()
    }

    pub fn receiver(&self) -> watch::Receiver<SnapshotSlot> {
        self.receiver.clone()
    }

    /// Wait for the next published snapshot.
    ///
    /// Returns `None` once the subscription has stopped.
    pub async fn changed(&mut self) -> Option<Arc<MetricSnapshot>> {
        self.receiver.changed().await.ok()?;
        self.latest()
    }

    /// Stop revalidating and wait for the task to exit.
    pub async fn unsubscribe(mut self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MetricSubscription {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn revalidate(
    aggregator: PerChainAggregator,
    kind: MetricKind,
    interval: Duration,
    sender: watch::Sender<SnapshotSlot>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let results = tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!("Discarding in-flight {} cycle", kind);
                break;
            }
            results = aggregator.aggregate(kind) => results,
        };

        match results {
            Ok(results) => {
                let snapshot = reduce(kind, &results, Utc::now());
                info!(
                    "{} snapshot: total={} present={}/{}",
                    kind,
                    snapshot.total,
                    snapshot.present_count(),
                    snapshot.entries.len()
                );
                sender.send_replace(Some(Arc::new(snapshot)));
            },
            Err(e) => {
                error!("{} aggregation failed, keeping previous snapshot: {}", kind, e);
            },
        }
    }

    info!("Unsubscribed from {}", kind);
}

/// One subscription per metric kind, sharing a parent cancellation token.
pub struct StatsHub {
    subscriptions: Vec<MetricSubscription>,
}

impl StatsHub {
    pub fn start(
        aggregator: PerChainAggregator,
        interval: Duration,
        cancel_token: &CancellationToken,
    ) -> Self {
        let subscriptions = MetricKind::ALL
            .into_iter()
            .map(|kind| {
                MetricSubscription::spawn_with_token(
                    aggregator.clone(),
                    kind,
                    interval,
                    cancel_token.child_token(),
                )
            })
            .collect();

        Self { subscriptions }
    }

    pub fn subscription(&self, kind: MetricKind) -> Option<&MetricSubscription> {
        self.subscriptions.iter().find(|s| s.kind() == kind)
    }

    pub fn snapshot(&self, kind: MetricKind) -> Option<Arc<MetricSnapshot>> {
        self.subscription(kind).and_then(MetricSubscription::latest)
    }

    /// Cheap read-only view for consumers that outlive a borrow of the hub.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            receivers: self
                .subscriptions
                .iter()
                .map(|s| (s.kind(), s.receiver()))
                .collect(),
        }
    }

    pub async fn shutdown(self) {
        for subscription in self.subscriptions {
            subscription.unsubscribe().await;
        }
    }
}

#[derive(Clone)]
pub struct SnapshotReader {
    receivers: Vec<(MetricKind, watch::Receiver<SnapshotSlot>)>,
}

impl SnapshotReader {
    /// Latest snapshot per metric, in [`MetricKind::ALL`] order.
    pub fn snapshots(&self) -> Vec<(MetricKind, Option<Arc<MetricSnapshot>>)> {
        self.receivers
            .iter()
            .map(|(kind, receiver)| (*kind, receiver.borrow().clone()))
            .collect()
    }
}
