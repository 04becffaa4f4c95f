//! Scriptable in-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::error::NetworkError;
use crate::fetcher::Transport;

#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<HashMap<Url, Result<Value, NetworkError>>>,
    delays: Mutex<HashMap<Url, Duration>>,
    calls: Mutex<HashMap<Url, usize>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &Url, body: Value) {
        self.responses.lock().unwrap().insert(url.clone(), Ok(body));
    }

    pub(crate) fn fail(&self, url: &Url) {
        self.responses.lock().unwrap().insert(
            url.clone(),
            Err(NetworkError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        );
    }

    pub(crate) fn delay(&self, url: &Url, delay: Duration) {
        self.delays.lock().unwrap().insert(url.clone(), delay);
    }

    pub(crate) fn calls(&self, url: &Url) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, NetworkError> {
        *self.calls.lock().unwrap().entry(url.clone()).or_default() += 1;

        let delay = self.delays.lock().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(NetworkError::Request(format!("no route to {}", url))))
    }
}
