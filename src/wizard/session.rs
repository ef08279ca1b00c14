// src/wizard/session.rs
use std::sync::Arc;
use tracing::{error, info};

use super::machine::WizardStateMachine;
use super::state::{ResumeFile, WizardState};
use crate::exporter::{ExportArtifact, ResultExporter};
use crate::orchestrator::AnalysisOrchestrator;
use crate::types::WizardError;

/// A wizard run driven from a single owner. Submitting a username borrows the
/// session mutably for the whole orchestration run, so a second submission
/// cannot start until the first resolves.
pub struct WizardSession {
    machine: WizardStateMachine,
    orchestrator: Arc<AnalysisOrchestrator>,
}

impl WizardSession {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>) -> Self {
        Self {
            machine: WizardStateMachine::new(),
            orchestrator,
        }
    }

    pub fn state(&self) -> &WizardState {
        self.machine.state()
    }

    pub fn submit_resume(&mut self, file: ResumeFile) -> Result<&WizardState, WizardError> {
        self.machine.submit_resume(file)
    }

    pub fn skip_resume(&mut self) -> Result<&WizardState, WizardError> {
        self.machine.skip_resume()
    }

    /// Validate the handle, run both analysis stages and fold the result in.
    pub async fn submit_username(&mut self, input: &str) -> Result<&WizardState, WizardError> {
        self.machine.submit_username(input)?;

        let result = self.orchestrator.run(self.machine.state()).await;
        match result {
            Ok(outcome) => {
                info!(
                    username = %outcome.github_analysis.username,
                    resume_analyzed = outcome.resume_analysis.is_some(),
                    "analysis complete"
                );
                self.machine.complete_analysis(outcome)
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                self.machine.fail_analysis()?;
                Err(e.into())
            }
        }
    }

    pub fn export(&self) -> Result<ExportArtifact, WizardError> {
        ResultExporter::export(self.machine.state())
    }

    pub fn reset(&mut self) -> &WizardState {
        self.machine.reset()
    }
}
