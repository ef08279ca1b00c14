// src/orchestrator.rs
//! Runs the two backend stages for a username submission.
//!
//! Stage A uploads the resume (only when one was provided) and is best
//! effort: its failure is logged and the run continues. Stage B analyzes the
//! GitHub profile and is mandatory. Stage A always resolves before Stage B
//! starts, so the backend sees the resume tagged with the handle before the
//! profile analysis for that handle begins.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, warn, Instrument};

use crate::core::{ProfileAnalysisService, ResumeService};
use crate::types::{GithubAnalysis, OrchestrationError, ResumeAnalysis, ServiceError};
use crate::wizard::{ResumeFile, WizardState};

const STAGE_RESUME: &str = "resume_submission";
const STAGE_PROFILE: &str = "profile_analysis";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub resume_analysis: Option<ResumeAnalysis>,
    pub github_analysis: GithubAnalysis,
}

pub struct AnalysisOrchestrator {
    resume_service: Arc<dyn ResumeService>,
    profile_service: Arc<dyn ProfileAnalysisService>,
    stage_timeout: Option<Duration>,
}

impl AnalysisOrchestrator {
    pub fn new(
        resume_service: Arc<dyn ResumeService>,
        profile_service: Arc<dyn ProfileAnalysisService>,
    ) -> Self {
        Self {
            resume_service,
            profile_service,
            stage_timeout: None,
        }
    }

    /// Bound each stage. `None` waits for as long as the backend takes.
    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout
    }

    pub async fn run(&self, state: &WizardState) -> Result<AnalysisOutcome, OrchestrationError> {
        let username = state
            .github_username
            .as_deref()
            .ok_or(OrchestrationError::MissingUsername)?;

        let span = info_span!("orchestration_run", username = %username);

        async move {
            let resume_analysis = match &state.resume_file {
                Some(file) => self.submit_resume(file, username).await,
                None => {
                    info!(event = "stage_skipped", stage = STAGE_RESUME, "no resume uploaded");
                    None
                }
            };

            let github_analysis = self
                .analyze_profile(username)
                .await
                .map_err(OrchestrationError::ProfileAnalysis)?;

            Ok::<_, OrchestrationError>(AnalysisOutcome {
                resume_analysis,
                github_analysis,
            })
        }
        .instrument(span)
        .await
    }

    async fn submit_resume(&self, file: &ResumeFile, username: &str) -> Option<ResumeAnalysis> {
        info!(
            event = "stage_started",
            stage = STAGE_RESUME,
            username = %username,
            file_name = %file.name(),
            size = file.size()
        );

        match self
            .bounded(self.resume_service.submit(file, Some(username)))
            .await
        {
            Ok(analysis) => {
                info!(event = "stage_succeeded", stage = STAGE_RESUME, username = %username);
                Some(analysis)
            }
            Err(e) => {
                warn!(
                    event = "stage_failed",
                    stage = STAGE_RESUME,
                    username = %username,
                    error = %e,
                    "continuing without resume analysis"
                );
                None
            }
        }
    }

    async fn analyze_profile(&self, username: &str) -> Result<GithubAnalysis, ServiceError> {
        info!(event = "stage_started", stage = STAGE_PROFILE, username = %username);

        match self.bounded(self.profile_service.analyze(username)).await {
            Ok(analysis) => {
                info!(
                    event = "stage_succeeded",
                    stage = STAGE_PROFILE,
                    username = %username,
                    repositories = analysis.repositories
                );
                Ok(analysis)
            }
            Err(e) => {
                warn!(
                    event = "stage_failed",
                    stage = STAGE_PROFILE,
                    username = %username,
                    error = %e
                );
                Err(e)
            }
        }
    }

    /// Apply the stage timeout. Dropping the timed-out future cancels the
    /// in-flight request.
    async fn bounded<T, F>(&self, stage: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, ServiceError>>,
    {
        match self.stage_timeout {
            Some(limit) => match tokio::time::timeout(limit, stage).await {
                Ok(result) => result,
                Err(_) => Err(ServiceError::Timeout(limit)),
            },
            None => stage.await,
        }
    }
}
