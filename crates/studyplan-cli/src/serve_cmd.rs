use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use studyplan_core::plan::{PlanRelay, PlanRequest, StudyPlan, validate};

use crate::config::ServerConfig;

/// Message returned for every relay-side failure. The real cause is only logged.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate study plan from the AI. Check API key validity or model limits.";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    /// Generic 500; the relay has already logged the underlying error.
    pub fn generation_failed() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: GENERATION_FAILED_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GeneratePlanResponse {
    pub success: bool,
    pub plan: StudyPlan,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the relay router.
///
/// CORS admits exactly one origin, only `POST`, and only the
/// `Content-Type` request header.
pub fn build_router(relay: Arc<PlanRelay>, allowed_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin)
        .with_context(|| format!("invalid CORS origin: {allowed_origin:?}"))?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/api/generate-plan", post(generate_plan))
        .route("/health", get(health))
        .layer(cors)
        .with_state(relay))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(relay: Arc<PlanRelay>, server: &ServerConfig) -> Result<()> {
    let app = build_router(relay.clone(), &server.allowed_origin)?;
    let addr: SocketAddr = format!("{}:{}", server.bind, server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", server.bind, server.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        provider = relay.provider_name(),
        allowed_origin = %server.allowed_origin,
        "studyplan serve listening on http://{addr}"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("studyplan serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C; shutting down");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn generate_plan(
    State(relay): State<Arc<PlanRelay>>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<GeneratePlanResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("generate_plan", %request_id);

    async move {
        let Json(request) = payload.map_err(|rejection| {
            warn!(error = %rejection.body_text(), "rejected request body");
            AppError::bad_request(format!("invalid request body: {}", rejection.body_text()))
        })?;

        let validated = validate(&request).map_err(|e| {
            warn!(error = %e, "rejected incomplete plan request");
            AppError::bad_request(e.to_string())
        })?;

        // The relay logs the underlying failure.
        let plan = relay
            .generate_plan(&validated)
            .await
            .map_err(|_| AppError::generation_failed())?;

        Ok::<_, AppError>(Json(GeneratePlanResponse {
            success: true,
            plan,
        }))
    }
    .instrument(span)
    .await
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
