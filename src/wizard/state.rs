// src/wizard/state.rs
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::{GithubAnalysis, ResumeAnalysis};
use crate::upload_validator::FileMeta;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Resume = 1,
    #[serde(rename = "github")]
    GitHub = 2,
    Results = 3,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resume => write!(f, "resume"),
            Self::GitHub => write!(f, "GitHub"),
            Self::Results => write!(f, "results"),
        }
    }
}

/// An uploaded resume. `meta.size` always matches the content length.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeFile {
    pub meta: FileMeta,
    pub content: Bytes,
}

impl ResumeFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            meta: FileMeta::new(name, content.len() as u64, mime_type),
            content,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn size(&self) -> u64 {
        self.meta.size
    }

    pub fn mime_type(&self) -> &str {
        &self.meta.mime_type
    }
}

/// Everything a session has collected so far.
///
/// Only [`super::transition`] produces new values; the invariants
/// `github_analysis.is_some() => current_step == Results` and
/// `is_processing => current_step == GitHub` and
/// `is_processing == run_id.is_some()` hold for every value it returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub current_step: WizardStep,
    pub resume_file: Option<ResumeFile>,
    pub resume_analysis: Option<ResumeAnalysis>,
    pub github_username: Option<String>,
    pub github_analysis: Option<GithubAnalysis>,
    pub is_processing: bool,
    /// Identifies the analysis run in flight; results from any other run are refused
    pub run_id: Option<Uuid>,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.current_step == WizardStep::Results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty_on_first_step() {
        let state = WizardState::new();
        assert_eq!(state.current_step, WizardStep::Resume);
        assert_eq!(state.current_step.number(), 1);
        assert!(state.resume_file.is_none());
        assert!(state.github_username.is_none());
        assert!(!state.is_processing);
        assert!(!state.is_complete());
        assert!(state.run_id.is_none());
    }

    #[test]
    fn test_step_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&WizardStep::GitHub).unwrap(), "\"github\"");
        assert_eq!(serde_json::to_string(&WizardStep::Results).unwrap(), "\"results\"");
    }

    #[test]
    fn test_steps_are_ordered() {
        assert!(WizardStep::Resume < WizardStep::GitHub);
        assert!(WizardStep::GitHub < WizardStep::Results);
        assert_eq!(WizardStep::Results.number(), 3);
    }

    #[test]
    fn test_resume_file_size_follows_content() {
        let file = ResumeFile::new("resume.pdf", "application/pdf", vec![0u8; 2048]);
        assert_eq!(file.size(), 2048);
        assert_eq!(file.name(), "resume.pdf");
        assert_eq!(file.mime_type(), "application/pdf");
    }
}
