// src/wizard/mod.rs
//! Three-step intake wizard: resume, GitHub handle, results

pub mod machine;
pub mod session;
pub mod state;

pub use machine::{transition, WizardEvent, WizardStateMachine};
pub use session::WizardSession;
pub use state::{ResumeFile, WizardState, WizardStep};
