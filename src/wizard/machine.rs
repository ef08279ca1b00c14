// src/wizard/machine.rs
use tracing::debug;
use uuid::Uuid;

use super::state::{ResumeFile, WizardState, WizardStep};
use crate::orchestrator::AnalysisOutcome;
use crate::types::WizardError;
use crate::upload_validator::UploadValidator;
use crate::username_validator::UsernameValidator;

#[derive(Debug, Clone)]
pub enum WizardEvent {
    SubmitResume(ResumeFile),
    SkipResume,
    SubmitUsername(String),
    AnalysisSucceeded {
        run_id: Uuid,
        outcome: AnalysisOutcome,
    },
    AnalysisFailed {
        run_id: Uuid,
    },
    Reset,
}

impl WizardEvent {
    fn action(&self) -> &'static str {
        match self {
            Self::SubmitResume(_) => "submit a resume",
            Self::SkipResume => "skip the resume",
            Self::SubmitUsername(_) => "submit a username",
            Self::AnalysisSucceeded { .. } => "record analysis results",
            Self::AnalysisFailed { .. } => "record an analysis failure",
            Self::Reset => "reset",
        }
    }
}

/// Compute the state that follows `event`. On error `state` is still the
/// current state.
pub fn transition(state: &WizardState, event: WizardEvent) -> Result<WizardState, WizardError> {
    use WizardEvent::*;
    use WizardStep::*;

    match (state.current_step, event) {
        (_, Reset) => Ok(WizardState::new()),

        // A run outlived by a reset or a newer submission
        (_, AnalysisSucceeded { run_id, .. } | AnalysisFailed { run_id })
            if state.run_id != Some(run_id) =>
        {
            Err(WizardError::StaleResult)
        }

        (Resume, SubmitResume(file)) => {
            UploadValidator::validate(&file.meta)?;
            Ok(WizardState {
                current_step: GitHub,
                resume_file: Some(file),
                ..state.clone()
            })
        }

        (Resume, SkipResume) => Ok(WizardState {
            current_step: GitHub,
            ..state.clone()
        }),

        (GitHub, SubmitUsername(_)) if state.is_processing => Err(WizardError::AlreadyProcessing),

        (GitHub, SubmitUsername(input)) => {
            let handle = UsernameValidator::validate(&input)?;
            Ok(WizardState {
                github_username: Some(handle),
                is_processing: true,
                run_id: Some(Uuid::new_v4()),
                ..state.clone()
            })
        }

        (GitHub, AnalysisSucceeded { outcome, .. }) if state.is_processing => Ok(WizardState {
            current_step: Results,
            resume_analysis: outcome.resume_analysis,
            github_analysis: Some(outcome.github_analysis),
            is_processing: false,
            run_id: None,
            ..state.clone()
        }),

        (GitHub, AnalysisFailed { .. }) if state.is_processing => Ok(WizardState {
            is_processing: false,
            run_id: None,
            ..state.clone()
        }),

        (step, event) => Err(WizardError::InvalidTransition {
            step,
            action: event.action(),
        }),
    }
}

/// Owns a session's [`WizardState`] and advances it one event at a time.
#[derive(Debug, Clone, Default)]
pub struct WizardStateMachine {
    state: WizardState,
}

impl WizardStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: WizardState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn into_state(self) -> WizardState {
        self.state
    }

    pub fn apply(&mut self, event: WizardEvent) -> Result<&WizardState, WizardError> {
        let from = self.state.current_step;
        let next = transition(&self.state, event)?;

        debug!(
            from = from.number(),
            to = next.current_step.number(),
            processing = next.is_processing,
            "wizard transition"
        );

        self.state = next;
        Ok(&self.state)
    }

    pub fn submit_resume(&mut self, file: ResumeFile) -> Result<&WizardState, WizardError> {
        self.apply(WizardEvent::SubmitResume(file))
    }

    pub fn skip_resume(&mut self) -> Result<&WizardState, WizardError> {
        self.apply(WizardEvent::SkipResume)
    }

    pub fn submit_username(&mut self, input: &str) -> Result<&WizardState, WizardError> {
        self.apply(WizardEvent::SubmitUsername(input.to_string()))
    }

    /// Record the result of the run currently in flight
    pub fn complete_analysis(
        &mut self,
        outcome: AnalysisOutcome,
    ) -> Result<&WizardState, WizardError> {
        let run_id = self.current_run("record analysis results")?;
        self.apply(WizardEvent::AnalysisSucceeded { run_id, outcome })
    }

    pub fn fail_analysis(&mut self) -> Result<&WizardState, WizardError> {
        let run_id = self.current_run("record an analysis failure")?;
        self.apply(WizardEvent::AnalysisFailed { run_id })
    }

    fn current_run(&self, action: &'static str) -> Result<Uuid, WizardError> {
        self.state.run_id.ok_or(WizardError::InvalidTransition {
            step: self.state.current_step,
            action,
        })
    }

    pub fn reset(&mut self) -> &WizardState {
        self.state = WizardState::new();
        debug!("wizard reset");
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GithubAnalysis;
    use crate::upload_validator::UploadRejection;
    use crate::username_validator::UsernameRejection;

    fn pdf(size: usize) -> ResumeFile {
        ResumeFile::new("resume.pdf", "application/pdf", vec![0u8; size])
    }

    fn analysis(username: &str) -> AnalysisOutcome {
        AnalysisOutcome {
            resume_analysis: None,
            github_analysis: GithubAnalysis {
                username: username.to_string(),
                repositories: 3,
                languages: vec!["Rust".to_string()],
                contributions: 10,
                top_projects: vec![],
                statistics: None,
            },
        }
    }

    fn processing_machine() -> WizardStateMachine {
        let mut machine = WizardStateMachine::new();
        machine.submit_resume(pdf(1024)).unwrap();
        machine.submit_username("octocat").unwrap();
        machine
    }

    #[test]
    fn test_valid_resume_advances_to_github_step() {
        let mut machine = WizardStateMachine::new();
        let state = machine.submit_resume(pdf(500 * 1024)).unwrap();

        assert_eq!(state.current_step, WizardStep::GitHub);
        assert_eq!(state.resume_file.as_ref().unwrap().name(), "resume.pdf");
    }

    #[test]
    fn test_rejected_resume_keeps_state() {
        let mut machine = WizardStateMachine::new();
        let image = ResumeFile::new("photo.png", "image/png", vec![0u8; 10]);

        let err = machine.submit_resume(image).unwrap_err();

        assert!(matches!(
            err,
            WizardError::Upload(UploadRejection::UnsupportedType { .. })
        ));
        assert_eq!(machine.state(), &WizardState::new());
    }

    #[test]
    fn test_skip_resume_advances_without_file() {
        let mut machine = WizardStateMachine::new();
        let state = machine.skip_resume().unwrap();

        assert_eq!(state.current_step, WizardStep::GitHub);
        assert!(state.resume_file.is_none());
    }

    #[test]
    fn test_submit_username_marks_processing() {
        let machine = processing_machine();
        let state = machine.state();

        assert_eq!(state.current_step, WizardStep::GitHub);
        assert!(state.is_processing);
        assert_eq!(state.github_username.as_deref(), Some("octocat"));
    }

    #[test]
    fn test_invalid_username_stays_on_github_step() {
        let mut machine = WizardStateMachine::new();
        machine.skip_resume().unwrap();

        let err = machine.submit_username("-bad-").unwrap_err();

        assert!(matches!(
            err,
            WizardError::Username(UsernameRejection::InvalidFormat(_))
        ));
        assert_eq!(machine.state().current_step, WizardStep::GitHub);
        assert!(!machine.state().is_processing);
        assert!(machine.state().github_username.is_none());
    }

    #[test]
    fn test_second_submission_while_processing_is_refused() {
        let mut machine = processing_machine();
        let before = machine.state().clone();

        let err = machine.submit_username("someone-else").unwrap_err();

        assert!(matches!(err, WizardError::AlreadyProcessing));
        assert_eq!(machine.state(), &before);
    }

    #[test]
    fn test_success_moves_to_results() {
        let mut machine = processing_machine();
        let state = machine.complete_analysis(analysis("octocat")).unwrap();

        assert_eq!(state.current_step, WizardStep::Results);
        assert!(!state.is_processing);
        assert_eq!(state.github_analysis.as_ref().unwrap().username, "octocat");
    }

    #[test]
    fn test_failure_keeps_resume_for_retry() {
        let mut machine = processing_machine();
        let state = machine.fail_analysis().unwrap();

        assert_eq!(state.current_step, WizardStep::GitHub);
        assert!(!state.is_processing);
        assert!(state.resume_file.is_some());

        // Retry without uploading again
        let state = machine.submit_username("octocat").unwrap();
        assert!(state.is_processing);
    }

    #[test]
    fn test_results_require_processing() {
        let mut machine = WizardStateMachine::new();
        machine.skip_resume().unwrap();

        let err = machine.complete_analysis(analysis("octocat")).unwrap_err();
        assert!(matches!(
            err,
            WizardError::InvalidTransition {
                step: WizardStep::GitHub,
                ..
            }
        ));
    }

    #[test]
    fn test_steps_never_go_backwards() {
        let mut machine = processing_machine();
        machine.complete_analysis(analysis("octocat")).unwrap();

        assert!(machine.submit_resume(pdf(10)).is_err());
        assert!(machine.skip_resume().is_err());
        assert!(machine.submit_username("octocat").is_err());
        assert_eq!(machine.state().current_step, WizardStep::Results);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut machine = processing_machine();
        machine.complete_analysis(analysis("octocat")).unwrap();

        let state = machine.reset();

        assert_eq!(state, &WizardState::new());
    }

    #[test]
    fn test_each_submission_starts_a_new_run() {
        let mut machine = processing_machine();
        let first = machine.state().run_id;
        machine.fail_analysis().unwrap();
        assert!(machine.state().run_id.is_none());

        machine.submit_username("octocat").unwrap();
        let second = machine.state().run_id;

        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
    }

    #[test]
    fn test_result_from_run_before_reset_is_refused() {
        let first = processing_machine().into_state();
        let stale_run = first.run_id.unwrap();

        let state = transition(&first, WizardEvent::Reset).unwrap();
        let state = transition(&state, WizardEvent::SkipResume).unwrap();
        let current = transition(&state, WizardEvent::SubmitUsername("bob".to_string())).unwrap();

        let err = transition(
            &current,
            WizardEvent::AnalysisSucceeded {
                run_id: stale_run,
                outcome: analysis("octocat"),
            },
        )
        .unwrap_err();
        assert!(matches!(err, WizardError::StaleResult));

        let err = transition(&current, WizardEvent::AnalysisFailed { run_id: stale_run }).unwrap_err();
        assert!(matches!(err, WizardError::StaleResult));
        assert!(current.is_processing);

        let done = transition(
            &current,
            WizardEvent::AnalysisSucceeded {
                run_id: current.run_id.unwrap(),
                outcome: analysis("bob"),
            },
        )
        .unwrap();
        assert_eq!(done.current_step, WizardStep::Results);
        assert_eq!(done.github_analysis.unwrap().username, "bob");
    }

    #[test]
    fn test_reset_event_is_accepted_from_every_step() {
        for state in [
            WizardState::new(),
            processing_machine().into_state(),
        ] {
            let next = transition(&state, WizardEvent::Reset).unwrap();
            assert_eq!(next, WizardState::new());
        }
    }
}
