// src/utils.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::upload_validator::{DOCX_MIME, DOC_MIME, PDF_MIME};

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Guess a resume MIME type from its file name
pub fn mime_type_for(filename: &str) -> Option<&'static str> {
    match get_file_extension(filename)?.as_str() {
        "pdf" => Some(PDF_MIME),
        "doc" => Some(DOC_MIME),
        "docx" => Some(DOCX_MIME),
        _ => None,
    }
}

/// Strip any directory components a browser may send with an upload name
pub fn base_file_name(raw: &str) -> String {
    raw.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("resume")
        .to_string()
}

/// Resolve a configured path against the current directory
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}

pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Remove a temporary file. Failure is logged, not returned.
pub async fn remove_scratch_file(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to remove temporary file {}: {}", path.display(), e);
            false
        }
    }
}
