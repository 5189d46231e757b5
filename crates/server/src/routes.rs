//! Router and handlers.

use crate::batch::BatchProcessor;
use crate::error::ApiError;
use crate::intake::{intake, rejection_error};
use crate::packager::{Packager, ProcessingResult};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pngtrim_core::config::ConfigSchema;
use pngtrim_core::naming::NamingPolicy;
use pngtrim_image::{BorderTrimmer, TrimOptions, Trimmer};
use pngtrim_telemetry::{metrics, Timer};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Immutable per-process state shared by every request.
pub struct AppState {
    /// Trims uploaded images
    pub batch: BatchProcessor,
    /// Shapes the response
    pub packager: Packager,
    /// Token inserted into renamed outputs
    pub marker: String,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl AppState {
    /// Build state with the default [`BorderTrimmer`].
    pub fn from_config(config: &ConfigSchema) -> Self {
        let trimmer = BorderTrimmer::new(TrimOptions {
            empty_image: config.processing.empty_image,
        });
        Self::with_trimmer(config, Arc::new(trimmer))
    }

    /// Build state around any [`Trimmer`].
    pub fn with_trimmer(config: &ConfigSchema, trimmer: Arc<dyn Trimmer>) -> Self {
        Self {
            batch: BatchProcessor::new(trimmer, config.processing.concurrency),
            packager: Packager::from_config(&config.packaging),
            marker: config.naming.marker.clone(),
            max_body_bytes: config.server.max_body_bytes,
        }
    }
}

/// Build the application router.
///
/// `POST /api/process` and its alias `POST /process` accept uploads;
/// `GET /health` and `GET /metrics` are for operators.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_body_bytes;

    Router::new()
        .route("/api/process", post(process_images))
        .route("/process", post(process_images))
        .route("/health", get(health))
        .route("/metrics", get(metrics_snapshot))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

async fn process_images(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ProcessingResult, ApiError> {
    metrics().increment("requests_total");
    let timer = Timer::start("request_duration_ms");

    let multipart = multipart.map_err(|rejection| rejection_error(&rejection))?;
    let items = intake(multipart, state.max_body_bytes).await?;

    let count = items.len();
    let naming = NamingPolicy::for_batch(count, state.packager.mode(), &state.marker);
    let processed = state.batch.process(items, &naming).await?;
    let result = state.packager.pack(processed)?;

    let elapsed = timer.stop();
    info!(
        count,
        shape = result.shape(),
        duration_ms = elapsed.as_millis() as u64,
        "Batch processed"
    );
    Ok(result)
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_snapshot() -> impl IntoResponse {
    Json(metrics().export_json())
}
