// src/sources/fetch.rs
//! Transport: one GET per endpoint, JSON body out. No retries, no caching.

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{PipelineError, Result};
use crate::sources::types::RawRecord;

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_json(&self, endpoint: &str) -> Result<RawRecord>;
}

/// Plain reqwest-backed fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("pickit-generator/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_json(&self, endpoint: &str) -> Result<RawRecord> {
        let t0 = std::time::Instant::now();
        counter!("pickit_fetch_total").increment(1);

        let resp = self.client.get(endpoint).send().await.map_err(|e| {
            tracing::warn!(target: "sources", error = ?e, endpoint, "http error");
            counter!("pickit_fetch_errors_total").increment(1);
            PipelineError::fetch(endpoint, e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            counter!("pickit_fetch_errors_total").increment(1);
            return Err(PipelineError::fetch(
                endpoint,
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                ),
            ));
        }

        let body = resp.json::<RawRecord>().await.map_err(|e| {
            counter!("pickit_fetch_errors_total").increment(1);
            PipelineError::fetch(endpoint, format!("invalid JSON: {e}"))
        })?;

        histogram!("pickit_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(body)
    }
}

/// In-memory fetcher serving canned bodies by endpoint. Unknown endpoints
/// behave like a 404. Records every request in order.
#[derive(Default)]
pub struct FixtureFetcher {
    bodies: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, endpoint: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(endpoint.into(), body.into());
        self
    }

    /// Endpoints requested so far, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("fixture mutex poisoned").clone()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch_json(&self, endpoint: &str) -> Result<RawRecord> {
        self.calls
            .lock()
            .expect("fixture mutex poisoned")
            .push(endpoint.to_string());

        let body = self
            .bodies
            .get(endpoint)
            .ok_or_else(|| PipelineError::fetch(endpoint, "HTTP 404: Not Found"))?;
        serde_json::from_str(body)
            .map_err(|e| PipelineError::fetch(endpoint, format!("invalid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_serves_known_and_fails_unknown() {
        let f = FixtureFetcher::new()
            .with_body("a", r#"{"x": 1}"#)
            .with_body("bad", "not json");

        let v = f.fetch_json("a").await.unwrap();
        assert_eq!(v["x"], 1);

        let e = f.fetch_json("missing").await.unwrap_err();
        assert!(matches!(e, PipelineError::Fetch { .. }));

        let e = f.fetch_json("bad").await.unwrap_err();
        assert!(e.to_string().contains("invalid JSON"));

        assert_eq!(f.calls(), vec!["a", "missing", "bad"]);
    }
}
