//! Axum route handler for the analysis API.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    Json,
};
use serde_json::Value;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::prompts::build_analysis_prompt;
use crate::analysis::validation::{shape_warnings, validate_model_output};
use crate::errors::AppError;
use crate::extraction::{extract_text, ExtractionError, UploadedDocument};
use crate::llm_client;
use crate::state::AppState;

const INVALID_FORM: &str = "Invalid form data.";
const MISSING_FIELDS: &str = "Missing file or job description.";

/// Fields of the `/analyze` multipart form.
#[derive(Debug, Default)]
struct AnalyzeForm {
    cv: Option<UploadedDocument>,
    job_description: String,
}

/// POST /analyze
///
/// Multipart form with a `cv` file part (`.pdf` or `.docx`) and a
/// `job_description` text part. Answers with the model's JSON verbatim.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let span = info_span!("analyze", request_id = %Uuid::new_v4());
    analyze(state, multipart).instrument(span).await
}

async fn analyze(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    info!("Starting document analysis request");

    let multipart = multipart.map_err(|e| {
        warn!("Request is not a multipart form: {e}");
        AppError::Validation(INVALID_FORM.to_string())
    })?;

    let form = read_form(multipart).await?;
    let (document, job_description) = match (form.cv, form.job_description) {
        (Some(doc), jd) if !jd.is_empty() => (doc, jd),
        (doc, jd) => {
            warn!(
                "Missing file or job description. File: {}, JD: {}",
                doc.is_some(),
                !jd.is_empty()
            );
            return Err(AppError::Validation(MISSING_FIELDS.to_string()));
        }
    };

    info!(
        "Processing file: {}, Size: {} bytes",
        document.file_name,
        document.size()
    );

    let cv_text = extract_text(&document).await?;
    if cv_text.trim().is_empty() {
        error!(
            "Could not extract text from resume file: {}",
            document.file_name
        );
        return Err(ExtractionError::NoText(document.file_name).into());
    }

    info!("Extracted text length: {} characters", cv_text.chars().count());

    let prompt = build_analysis_prompt(&cv_text, &job_description);

    info!("Sending request to chat model");
    let raw = llm_client::complete(state.model.as_ref(), &prompt).await?;
    info!("Received response from chat model");

    let parsed = validate_model_output(&raw)?;
    let warnings = shape_warnings(&parsed);
    if !warnings.is_empty() {
        warn!("Model response deviates from requested shape: {warnings:?}");
    }

    info!("Successfully parsed AI response as JSON");
    Ok(Json(parsed))
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cv" => {
                // A `cv` part without a file name is a plain field, not an upload.
                // The first uploaded `cv` wins; later ones are ignored.
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                if form.cv.is_some() {
                    continue;
                }
                let content = field.bytes().await.map_err(invalid_form)?;
                form.cv = Some(UploadedDocument { file_name, content });
            }
            "job_description" => {
                form.job_description = field.text().await.map_err(invalid_form)?;
            }
            _ => {}
        }
    }

    Ok(form)
}

fn invalid_form(e: MultipartError) -> AppError {
    warn!("Failed to read multipart form: {e}");
    AppError::Validation(INVALID_FORM.to_string())
}
