//! Text extraction: turns an uploaded résumé into plain text.
//!
//! The format is chosen from the file name's extension only. Parsing is
//! CPU-bound and runs on the blocking pool so a large upload never stalls
//! other requests.

pub mod docx;
pub mod pdf;

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("file '{0}' has no extension")]
    MissingExtension(String),

    #[error("unsupported file extension '.{0}'")]
    UnsupportedFormat(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("no text could be extracted from '{0}'")]
    NoText(String),

    #[error("extraction task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolves the format from a file name, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractionError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ExtractionError::MissingExtension(file_name.to_string()))?
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            _ => Err(ExtractionError::UnsupportedFormat(extension)),
        }
    }
}

/// A résumé received in the `cv` form part. Lives for one request only.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content: Bytes,
}

impl UploadedDocument {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Extracts plain text from an uploaded document.
///
/// Returns `Ok` with possibly-empty text when the document was readable;
/// callers decide whether blank text is acceptable.
pub async fn extract_text(document: &UploadedDocument) -> Result<String, ExtractionError> {
    let format = DocumentFormat::from_file_name(&document.file_name).map_err(|e| {
        warn!("Rejecting {}: {e}", document.file_name);
        e
    })?;

    info!("Extracting text from {:?} file {}", format, document.file_name);

    let content = document.content.clone();
    let text = tokio::task::spawn_blocking(move || match format {
        DocumentFormat::Pdf => pdf::extract_pdf_text(&content),
        DocumentFormat::Docx => docx::extract_docx_text(&content),
    })
    .await
    .map_err(|e| ExtractionError::Aborted(e.to_string()))??;

    info!(
        "Extracted {} characters from {}",
        text.chars().count(),
        document.file_name
    );

    Ok(text)
}
