// src/core/services.rs
//! Backend operations the orchestrator depends on

use async_trait::async_trait;

use crate::types::{GithubAnalysis, ResumeAnalysis, ServiceError};
use crate::wizard::ResumeFile;

/// `POST /resume/analyze`
#[async_trait]
pub trait ResumeService: Send + Sync {
    /// Upload a resume, tagged with the GitHub handle when one is known
    async fn submit(
        &self,
        file: &ResumeFile,
        username: Option<&str>,
    ) -> Result<ResumeAnalysis, ServiceError>;
}

/// `POST /github/analyze`
#[async_trait]
pub trait ProfileAnalysisService: Send + Sync {
    async fn analyze(&self, username: &str) -> Result<GithubAnalysis, ServiceError>;
}
