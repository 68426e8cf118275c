//! HTTP service for SVG to Lottie conversion.
//!
//! ## API
//! - `GET /health`
//! - `GET /animation-types`
//! - `POST /convert` with `{ "base64_svg": ..., "animation_type"?, "fps"?,
//!   "duration"?, "custom_effects"?, "layers"? }`
//!
//! Conversion runs on the blocking pool so parsing large documents never
//! stalls the async workers.

use crate::convert::{convert_payload, ConvertError};
use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use lottie_motion::{AnimationRequest, AnimationType, CustomEffect, MotionDefaults, MotionError};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

pub const SERVICE_NAME: &str = "SVG to Animated Lottie Converter API";

#[derive(Clone)]
pub struct AppState {
    defaults: Arc<MotionDefaults>,
    allow_origin: HeaderValue,
}

impl AppState {
    pub fn new(defaults: MotionDefaults) -> Self {
        Self {
            defaults: Arc::new(defaults),
            allow_origin: HeaderValue::from_static("*"),
        }
    }

    pub fn with_allow_origin(mut self, origin: HeaderValue) -> Self {
        self.allow_origin = origin;
        self
    }
}

#[derive(Clone, Debug, Serialize)]
struct ApiError {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provided: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            kind: None,
            provided: None,
        }
    }
}

fn error_response(status: StatusCode, err: ApiError) -> Response {
    (status, Json(err)).into_response()
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.allow_origin.clone())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/animation-types", get(animation_types_handler))
        .route("/convert", post(convert_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .with_state(state)
}

/// Binds `host:port` and serves until the listener fails.
pub async fn serve(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    info!("Starting {} on http://{}", SERVICE_NAME, listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn animation_types_handler() -> Json<Value> {
    let available: Vec<&str> = AnimationType::ALL.iter().map(|t| t.as_str()).collect();
    Json(json!({
        "available_types": available,
        "default": AnimationType::default().as_str(),
    }))
}

async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "message": "The requested endpoint does not exist",
            "available_endpoints": ["/health", "/convert", "/animation-types"],
        })),
    )
        .into_response()
}

async fn convert_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let object = match body {
        Ok(Json(Value::Object(object))) if !object.is_empty() => object,
        Ok(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ApiError::new("No JSON data provided", "Request body must be a JSON object"),
            )
        }
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ApiError::new("No JSON data provided", rejection.body_text()),
            )
        }
    };

    let (payload, request) = match parse_convert_body(object) {
        Ok(parsed) => parsed,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err),
    };
    info!(
        animation_type = %request.animation_type,
        payload_bytes = payload.len(),
        "conversion requested"
    );

    let defaults = state.defaults.clone();
    let result =
        tokio::task::spawn_blocking(move || convert_payload(&payload, &request, &defaults)).await;

    match result {
        Ok(Ok(doc)) => Json(doc).into_response(),
        Ok(Err(err)) => conversion_error(err),
        Err(join_err) => {
            error!(error = %join_err, "conversion task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("Internal server error", "An unexpected error occurred"),
            )
        }
    }
}

fn parse_convert_body(mut body: Map<String, Value>) -> Result<(String, AnimationRequest), ApiError> {
    let payload = match body.remove("base64_svg") {
        Some(Value::String(payload)) if !payload.trim().is_empty() => payload,
        _ => {
            return Err(ApiError::new(
                "Missing required field",
                "base64_svg field is required",
            ))
        }
    };

    let animation_type = match body.remove("animation_type") {
        None | Some(Value::Null) => AnimationType::default(),
        Some(Value::String(name)) => name.parse::<AnimationType>().map_err(|_| invalid_type(name))?,
        Some(other) => return Err(invalid_type(other.to_string())),
    };

    let mut request = AnimationRequest::new(animation_type);
    request.fps = positive_field(&mut body, "fps")?;
    request.duration = positive_field(&mut body, "duration")?;

    if let Some(effects) = body.remove("custom_effects").filter(|v| !v.is_null()) {
        let effects: BTreeMap<String, CustomEffect> = serde_json::from_value(effects)
            .map_err(|e| ApiError::new("Invalid custom_effects", e.to_string()))?;
        request.custom_effects = Some(effects);
    }
    if let Some(layers) = body.remove("layers").filter(|v| !v.is_null()) {
        let layers: Vec<String> = serde_json::from_value(layers)
            .map_err(|_| ApiError::new("Invalid layers", "layers must be a list of layer ids"))?;
        request.layers = Some(layers);
    }

    Ok((payload, request))
}

fn invalid_type(provided: String) -> ApiError {
    ApiError {
        provided: Some(provided),
        ..ApiError::new(
            "Invalid animation type",
            format!("animation_type must be one of: {}", AnimationType::available()),
        )
    }
}

fn positive_field(body: &mut Map<String, Value>, field: &str) -> Result<Option<u32>, ApiError> {
    match body.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .filter(|v| *v > 0)
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| {
                ApiError::new(
                    format!("Invalid {field} value"),
                    format!("{field} must be a positive integer"),
                )
            }),
    }
}

/// 400 for bad input, 422 for well-formed requests the engine cannot
/// satisfy, 500 for engine invariant failures.
fn conversion_status(err: &ConvertError) -> StatusCode {
    match err {
        ConvertError::Import(_) => StatusCode::BAD_REQUEST,
        ConvertError::Motion(e) if e.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
        ConvertError::Motion(
            MotionError::ConflictingEffectWindow { .. }
            | MotionError::DurationTooShort { .. }
            | MotionError::EmptyCanvas { .. },
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        ConvertError::Motion(_) => StatusCode::BAD_REQUEST,
    }
}

fn conversion_error(err: ConvertError) -> Response {
    let status = conversion_status(&err);
    let kind = match &err {
        ConvertError::Motion(e) => Some(e.kind()),
        ConvertError::Import(_) => Some("invalid_svg"),
    };

    let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "conversion failed unexpectedly");
        ApiError::new("Internal server error", "An unexpected error occurred")
    } else if status == StatusCode::UNPROCESSABLE_ENTITY {
        warn!(error = %err, "conversion rejected");
        ApiError {
            kind,
            ..ApiError::new("Conversion failed", err.to_string())
        }
    } else {
        warn!(error = %err, "invalid conversion input");
        ApiError {
            kind,
            ..ApiError::new("Invalid input data", err.to_string())
        }
    };
    error_response(status, body)
}
