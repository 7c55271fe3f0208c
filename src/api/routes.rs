use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::app::GenerationService;
use crate::domain::{ErrorKind, GenerationError, GenerationResult};
use crate::infra::llm::CodeGenerator;

/// `max_body_bytes` bounds the `/generate-code` body; larger requests get 413.
pub fn router<G>(service: GenerationService<G>, max_body_bytes: usize) -> Router
where
    G: CodeGenerator + 'static,
{
    Router::new()
        .route(
            "/generate-code",
            post(generate_code::<G>).layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route("/models", get(list_models::<G>))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(service)
}

async fn generate_code<G>(
    State(service): State<GenerationService<G>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<GenerationResult>, ApiError>
where
    G: CodeGenerator + 'static,
{
    let body = body.map_err(|rejection| ApiError::Body {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;
    let result = service.generate_from_json(&body).await?;
    Ok(Json(result))
}

async fn list_models<G>(State(service): State<GenerationService<G>>) -> Json<serde_json::Value>
where
    G: CodeGenerator + 'static,
{
    Json(json!({ "models": service.model_ids() }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Boundary form of a failed request.
#[derive(Debug)]
pub enum ApiError {
    Generation(GenerationError),
    /// The body could not be read, e.g. it exceeded the body limit.
    Body { status: StatusCode, message: String },
}

impl From<GenerationError> for ApiError {
    fn from(error: GenerationError) -> Self {
        Self::Generation(error)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match self {
            Self::Generation(error) => error,
            Self::Body { status, message } => {
                let body = ErrorBody {
                    error: "Invalid request data",
                    kind: None,
                    message,
                    model: None,
                };
                return (status, Json(body)).into_response();
            }
        };
        let status =
            StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: error.title(),
            kind: status.is_server_error().then_some(error.kind()),
            message: error.to_string(),
            model: error.model(),
        };
        (status, Json(body)).into_response()
    }
}
