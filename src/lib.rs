// src/lib.rs
// Public library surface for the server, the CLI and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod sources;
pub mod static_rules;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::Settings;
pub use crate::error::{PipelineError, RunFailure};
pub use crate::pipeline::{Pipeline, ProcessRequest, ProcessedOutput};

use std::sync::Arc;

use crate::sources::HttpFetcher;

/// Build the pipeline against the live price APIs using `settings`.
pub fn http_pipeline(settings: &Settings) -> anyhow::Result<Pipeline> {
    let fetcher = HttpFetcher::new(settings.http_timeout_secs)?;
    Ok(Pipeline::new(settings, Arc::new(fetcher)))
}
