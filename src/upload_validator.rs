// src/upload_validator.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const MAX_RESUME_SIZE: u64 = 10 * 1024 * 1024;

pub const PDF_MIME: &str = "application/pdf";
pub const DOC_MIME: &str = "application/msword";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const ALLOWED_MIME_TYPES: [&str; 3] = [PDF_MIME, DOC_MIME, DOCX_MIME];

/// Metadata of a file selected for upload. The content itself is never
/// looked at during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Only PDF and Word documents are supported. Received: {mime_type}")]
    UnsupportedType { mime_type: String },

    #[error("File too large: {:.1}MB (max 10MB)", megabytes(.size))]
    TooLarge { size: u64 },
}

impl UploadRejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            Self::TooLarge { .. } => "FILE_TOO_LARGE",
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnsupportedType { .. } => vec![
                "Upload a PDF file (.pdf)".to_string(),
                "Upload a Word document (.doc or .docx)".to_string(),
            ],
            Self::TooLarge { .. } => vec![
                "Compress your resume file".to_string(),
                "Use a smaller file size (max 10MB)".to_string(),
            ],
        }
    }
}

pub struct UploadValidator;

impl UploadValidator {
    /// Accept or reject a resume by its declared type and size
    pub fn validate(file: &FileMeta) -> Result<(), UploadRejection> {
        let mime_type = essence(&file.mime_type);

        if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
            warn!(
                file_name = %file.name,
                mime_type = %file.mime_type,
                "resume rejected: unsupported type"
            );
            return Err(UploadRejection::UnsupportedType {
                mime_type: file.mime_type.clone(),
            });
        }

        if file.size > MAX_RESUME_SIZE {
            warn!(file_name = %file.name, size = file.size, "resume rejected: too large");
            return Err(UploadRejection::TooLarge { size: file.size });
        }

        debug!(file_name = %file.name, size = file.size, "resume accepted");
        Ok(())
    }
}

fn megabytes(size: &u64) -> f64 {
    *size as f64 / 1024.0 / 1024.0
}

/// `Application/PDF; charset=binary` -> `application/pdf`
fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
