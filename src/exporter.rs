// src/exporter.rs
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::WizardError;
use crate::utils::ensure_dir_exists;
use crate::wizard::WizardState;

/// Downloadable snapshot of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportArtifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

fn iso_millis<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl ExportArtifact {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize export")
    }

    /// `digital-twin-octocat-20250101_120000.json`
    pub fn file_name(&self) -> String {
        format!(
            "digital-twin-{}-{}.json",
            self.github.as_deref().unwrap_or("anonymous"),
            self.timestamp.format("%Y%m%d_%H%M%S")
        )
    }

    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        ensure_dir_exists(dir).await?;

        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.to_json()?)
            .await
            .with_context(|| format!("Failed to write export: {}", path.display()))?;

        info!("Export written to {}", path.display());
        Ok(path)
    }
}

pub struct ResultExporter;

impl ResultExporter {
    pub fn export(state: &WizardState) -> Result<ExportArtifact, WizardError> {
        Self::export_at(state, Utc::now())
    }

    pub fn export_at(
        state: &WizardState,
        timestamp: DateTime<Utc>,
    ) -> Result<ExportArtifact, WizardError> {
        if !state.is_complete() {
            return Err(WizardError::NotReady);
        }

        Ok(ExportArtifact {
            resume: state.resume_file.as_ref().map(|f| f.name().to_string()),
            github: state.github_username.clone(),
            timestamp,
        })
    }
}
