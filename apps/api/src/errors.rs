use std::any::Any;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::validation::MalformedResponse;
use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;

const PROBLEM_TYPE: &str = "https://tools.ietf.org/html/rfc9110#section-15.6.1";
const PROBLEM_TITLE: &str = "An error occurred while processing your request.";
const UNEXPECTED: &str = "An unexpected error occurred";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Client-side failures answer 400 with a plain-text reason; server-side
/// failures answer 500 with an `application/problem+json` body whose detail
/// never carries the underlying error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed model response: {0}")]
    MalformedResponse(#[from] MalformedResponse),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(msg) => {
                tracing::warn!("Rejected request: {msg}");
                bad_request(msg)
            }
            AppError::Extraction(e) => {
                tracing::error!("Extraction error: {e}");
                bad_request("Could not extract text from resume.".to_string())
            }
            AppError::Llm(LlmError::EmptyContent) => {
                tracing::error!("No response received from the chat model");
                problem("No response from AI service")
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                problem(UNEXPECTED)
            }
            AppError::MalformedResponse(e) => {
                tracing::error!("{e}. Response: {}", e.raw);
                problem("Invalid JSON response from AI service")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                problem(UNEXPECTED)
            }
        }
    }
}

/// Panic hook for `CatchPanicLayer`: logs the payload and answers with the
/// generic problem response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

fn problem(detail: &str) -> Response {
    let body = json!({
        "type": PROBLEM_TYPE,
        "title": PROBLEM_TITLE,
        "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        "detail": detail,
    });

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/problem+json")],
        body.to_string(),
    )
        .into_response()
}
