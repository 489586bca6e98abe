use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::pipeline::{CategoryListing, Pipeline, ProcessRequest};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/categories", get(categories))
        .route("/process", post(process))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct CategoriesResp {
    categories: CategoryListing,
}

async fn categories(State(state): State<AppState>) -> Json<CategoriesResp> {
    Json(CategoriesResp {
        categories: state.pipeline.categories(),
    })
}

#[derive(Serialize)]
#[serde(untagged)]
enum ProcessResp {
    Success {
        success: bool,
        result: String,
        logs: Vec<String>,
        total_items: usize,
        generated_at: String,
    },
    Failure {
        success: bool,
        error: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        logs: Vec<String>,
    },
}

impl ProcessResp {
    fn failure(error: impl ToString, logs: Vec<String>) -> Self {
        Self::Failure {
            success: false,
            error: error.to_string(),
            logs,
        }
    }
}

async fn process(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> (StatusCode, Json<ProcessResp>) {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => {
            tracing::warn!(error = %rej.body_text(), "rejected /process body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ProcessResp::failure(rej.body_text(), Vec::new())),
            );
        }
    };

    let opts = match body.resolve(state.pipeline.defaults()) {
        Ok(o) => o,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ProcessResp::failure(e, Vec::new())),
            )
        }
    };

    if opts.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ProcessResp::failure(
                "Please select at least one category",
                Vec::new(),
            )),
        );
    }

    match state.pipeline.run(&opts).await {
        Ok(out) => (
            StatusCode::OK,
            Json(ProcessResp::Success {
                success: true,
                result: out.result,
                logs: out.logs,
                total_items: out.total_items,
                generated_at: out.generated_at.to_rfc3339(),
            }),
        ),
        Err(fail) => {
            tracing::error!(error = %fail, "processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProcessResp::failure(&fail.message, fail.logs)),
            )
        }
    }
}
