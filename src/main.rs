//! Pickit generator service: binary entrypoint.
//! Boots the Axum HTTP server with the price pipeline and Prometheus metrics.

use pickit_generator::{api, http_pipeline, metrics::Metrics, AppState, Settings};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - PICKIT_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("PICKIT_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pickit_generator=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let settings = Settings::load_default()?;
    tracing::info!(league = %settings.league, "settings loaded");

    let pipeline = http_pipeline(&settings)?;
    let mut router = api::router(AppState::new(pipeline));

    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => tracing::warn!(error = ?e, "prometheus recorder not installed"),
    }

    Ok(router.into())
}
