//! Scripted transport for client tests

use super::error::FetchError;
use super::transport::Transport;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves canned documents by URL and records every request.
///
/// Unknown URLs answer with `FetchError::NotFound`. Clones share state so a
/// test can keep a handle after moving one into the client.
#[derive(Clone, Default)]
pub struct FakeTransport {
    responses: Arc<Mutex<HashMap<String, Result<Value, FetchError>>>>,
    requests: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: impl Into<String>, body: Value) -> Self {
        self.responses.lock().unwrap().insert(url.into(), Ok(body));
        self
    }

    pub fn with_error(self, url: impl Into<String>, error: FetchError) -> Self {
        self.responses.lock().unwrap().insert(url.into(), Err(error));
        self
    }

    /// Hold every response for `delay` so concurrent callers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::NotFound))
    }
}
