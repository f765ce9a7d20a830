use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::prediction::PredictionService;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorError,
    GovernorLayer,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Prediction pipeline over the read-only model artifacts.
    pub service: PredictionService,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, predict),
    components(schemas(
        ObservationPayload,
        PredictionResponse,
        CalculatedValues,
        Finding,
        ErrorResponse,
        HealthResponse
    )),
    tags((name = "prediction", description = "Liver disease stage prediction"))
)]
pub struct ApiDoc;

/// Builds the application routes without any middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", post(predict))
        .route("/api/v1/predict", post(predict))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// Builds the full application: routes plus body limit, per-IP rate
/// limiting, panic capture, tracing and CORS.
///
/// Every rejection produced by the middleware is rendered as the regular
/// `{"error": ...}` 500 response.
pub fn app(state: Arc<AppState>) -> anyhow::Result<Router> {
    let config = &state.config;

    // Configure rate limiter per IP
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .error_handler(handle_governor_error)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );
    let max_body_bytes = config.max_body_bytes;

    Ok(router(state)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(max_body_bytes))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}

fn handle_governor_error(err: GovernorError) -> Response {
    match err {
        GovernorError::TooManyRequests { wait_time, .. } => AppError::Validation(format!(
            "too many requests, retry in {}s",
            wait_time
        ))
        .into_response(),
        other => AppError::Internal(format!("rate limiter: {}", other)).into_response(),
    }
}

/// Turns a panic inside a handler into the regular `{"error": ...}` response.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(details).into_response()
}

/// Health check endpoint.
///
/// Returns the service status, version and model information.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "prediction"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let artifacts = state.service.artifacts();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model_loaded_at: artifacts.loaded_at.to_rfc3339(),
            feature_count: artifacts.feature_names().len(),
        }),
    )
}

/// POST / and POST /api/v1/predict
///
/// Predicts the liver disease stage for one observation and explains every
/// input value. The body is parsed here rather than by the `Json` extractor
/// so malformed input gets the same `{"error": ...}` shape as every other
/// failure, and an unreadable or oversized body is rejected the same way.
#[utoipa::path(
    post,
    path = "/api/v1/predict",
    request_body = ObservationPayload,
    responses(
        (status = 200, description = "Predicted stage with explanations", body = PredictionResponse),
        (status = 500, description = "Invalid input, model failure or internal error", body = ErrorResponse)
    ),
    tag = "prediction"
)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id);

    span.in_scope(|| -> Result<Json<PredictionResponse>, AppError> {
        let body = body.map_err(|e| AppError::Validation(e.body_text()))?;
        tracing::info!("POST /predict - {} bytes", body.len());

        let observation = PatientObservation::from_json_slice(&body)?;
        let response = state.service.predict(&observation)?;

        tracing::info!(
            "Prediction complete: stage={}, ast_alt_ratio={}, fib4={}, ag_ratio={}",
            response.predicted_stage,
            response.calculated_values.ast_alt_ratio,
            response.calculated_values.fib4_score,
            response.calculated_values.albumin_globulin_ratio
        );

        Ok(Json(response))
    })
}
