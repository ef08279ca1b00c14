// src/types/mod.rs
pub mod errors;
pub mod response;

pub use errors::{OrchestrationError, ServiceError, WizardError};
pub use response::{ApiEnvelope, GithubAnalysis, ResumeAnalysis, TopProject};
