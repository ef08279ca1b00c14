// src/types/errors.rs
use std::time::Duration;
use thiserror::Error;

use crate::upload_validator::UploadRejection;
use crate::username_validator::UsernameRejection;
use crate::wizard::WizardStep;

/// Failure of a single outbound backend call.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("service returned error status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed service response: {0}")]
    Malformed(String),

    #[error("service reported failure: {0}")]
    Reported(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Error)]
pub enum OrchestrationError {
    #[error("no GitHub username has been submitted")]
    MissingUsername,

    #[error("GitHub profile analysis failed: {0}")]
    ProfileAnalysis(#[source] ServiceError),
}

#[derive(Debug, Clone, Error)]
pub enum WizardError {
    #[error(transparent)]
    Upload(#[from] UploadRejection),

    #[error(transparent)]
    Username(#[from] UsernameRejection),

    #[error("cannot {action} while on the {step} step")]
    InvalidTransition {
        step: WizardStep,
        action: &'static str,
    },

    #[error("an analysis is already running for this session")]
    AlreadyProcessing,

    #[error("results are not available before the analysis completes")]
    NotReady,

    #[error("analysis result belongs to a run that is no longer current")]
    StaleResult,

    #[error(transparent)]
    Analysis(#[from] OrchestrationError),
}

impl WizardError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Upload(rejection) => rejection.code(),
            Self::Username(rejection) => rejection.code(),
            Self::InvalidTransition { .. } => "INVALID_STEP",
            Self::AlreadyProcessing => "ANALYSIS_IN_PROGRESS",
            Self::NotReady => "RESULTS_NOT_READY",
            Self::StaleResult => "STALE_RESULT",
            Self::Analysis(OrchestrationError::MissingUsername) => "USERNAME_MISSING",
            Self::Analysis(OrchestrationError::ProfileAnalysis(_)) => "ANALYSIS_FAILED",
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Upload(rejection) => rejection.suggestions(),
            Self::Username(rejection) => rejection.suggestions(),
            Self::InvalidTransition { .. } => vec![
                "Complete the wizard steps in order".to_string(),
                "Restart the wizard to begin again".to_string(),
            ],
            Self::AlreadyProcessing => {
                vec!["Wait for the running analysis to finish".to_string()]
            }
            Self::NotReady => vec!["Submit a GitHub username first".to_string()],
            Self::StaleResult => vec!["Fetch the session state to see the current run".to_string()],
            Self::Analysis(_) => vec![
                "Check that the GitHub username exists".to_string(),
                "Try again in a few moments".to_string(),
            ],
        }
    }
}
