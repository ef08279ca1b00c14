//! Digital twin intake: a two-step wizard that collects a resume and a
//! GitHub handle, runs both analyses against the backend and exports the
//! combined result.

pub mod cli;
pub mod core;
pub mod exporter;
pub mod orchestrator;
pub mod types;
pub mod upload_validator;
pub mod username_validator;
pub mod utils;
pub mod web;
pub mod wizard;

pub use crate::core::{ConfigManager, ProfileAnalysisService, ResumeService, ServiceClient};
pub use exporter::{ExportArtifact, ResultExporter};
pub use orchestrator::{AnalysisOrchestrator, AnalysisOutcome};
pub use types::{OrchestrationError, ServiceError, WizardError};
pub use upload_validator::{FileMeta, UploadRejection, UploadValidator};
pub use username_validator::{UsernameRejection, UsernameValidator};
pub use web::{build_rocket, start_web_server};
pub use wizard::{ResumeFile, WizardEvent, WizardSession, WizardState, WizardStateMachine, WizardStep};
