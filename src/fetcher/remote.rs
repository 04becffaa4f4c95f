use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, warn};
use moka::future::Cache;
use rustc_hash::FxHashMap;
use serde_json::Value;
use url::Url;

use crate::config::FetcherSettings;
use crate::error::{NetworkError, Result, StatsError};
use crate::fetcher::Transport;

type FetchOutcome = Result<Arc<Value>, NetworkError>;
type InFlight = Shared<BoxFuture<'static, FetchOutcome>>;

/// JSON retrieval with in-flight deduplication and stale serving.
///
/// - At most one outstanding request per URL; concurrent callers share it
/// - The last successful payload per URL is kept and served when a later
///   request fails
/// - Failures never reach the caller as errors, only as `None`
///
/// Requests run on their own task, so a caller that gives up early never
/// leaves the in-flight table or the last-good cache half updated.
#[derive(Clone)]
pub struct RemoteFetcher {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    in_flight: Mutex<FxHashMap<Url, InFlight>>,
    last_good: Cache<Url, Arc<Value>>,
}

impl Inner {
    fn in_flight(&self) -> MutexGuard<'_, FxHashMap<Url, InFlight>> {
        // The map is only touched for single insert/remove calls, so a
        // poisoned lock still holds a consistent map
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RemoteFetcher {
    /// Fails when `cache_capacity` is zero, which would turn stale serving off.
    pub fn new(transport: Arc<dyn Transport>, settings: &FetcherSettings) -> Result<Self> {
        if settings.cache_capacity == 0 {
            return Err(StatsError::Config(
                "fetcher.cache_capacity must be at least 1".to_string(),
            ));
        }

        let mut builder = Cache::builder().max_capacity(settings.cache_capacity);
        if let Some(ttl) = settings.stale_ttl_secs {
            builder = builder.time_to_live(Duration::from_secs(ttl));
        }

        Ok(Self {
            inner: Arc::new(Inner {
                transport,
                in_flight: Mutex::new(FxHashMap::default()),
                last_good: builder.build(),
            }),
        })
    }

    /// Fetch `url`, joining an outstanding request for it if there is one.
    ///
    /// Returns the fresh payload on success, the last good payload if this
    /// request failed, or `None` if nothing good was ever received.
    pub async fn fetch(&self, url: &Url) -> Option<Arc<Value>> {
        match self.request(url).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Fetch failed for {}: {}", url, e);

                let stale = self.inner.last_good.get(url).await;
                if stale.is_some() {
                    debug!("Serving last good payload for {}", url);
                }
                stale
            },
        }
    }

    /// Last successful payload for `url`, without touching the network.
    pub async fn cached(&self, url: &Url) -> Option<Arc<Value>> {
        self.inner.last_good.get(url).await
    }

    /// Number of URLs with a request currently outstanding.
    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight().len()
    }

    fn request(&self, url: &Url) -> InFlight {
        let mut in_flight = self.inner.in_flight();

        if let Some(existing) = in_flight.get(url) {
            debug!("Joining in-flight request for {}", url);
            return existing.clone();
        }

        // The lock is held until the entry is inserted, so the task below
        // cannot remove it before it exists
        let inner = self.inner.clone();
        let key = url.clone();
        let handle = tokio::spawn(async move {
            let outcome = inner.transport.get_json(&key).await.map(Arc::new);

            if let Ok(payload) = &outcome {
                inner.last_good.insert(key.clone(), payload.clone()).await;
            }
            inner.in_flight().remove(&key);

            outcome
        });

        let inner = self.inner.clone();
        let key = url.clone();
        let shared = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    inner.in_flight().remove(&key);
                    Err(NetworkError::Request(format!("fetch task failed: {}", e)))
                },
            }
        }
        .boxed()
        .shared();

        in_flight.insert(url.clone(), shared.clone());
        shared
    }
}
