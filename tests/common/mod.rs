#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use twin_intake::core::{ProfileAnalysisService, ResumeService};
use twin_intake::types::{GithubAnalysis, ResumeAnalysis, ServiceError};
use twin_intake::{AnalysisOrchestrator, ResumeFile};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub struct FakeResumeService {
    pub log: CallLog,
    pub delay: Duration,
    pub fail: bool,
}

#[async_trait]
impl ResumeService for FakeResumeService {
    async fn submit(
        &self,
        file: &ResumeFile,
        username: Option<&str>,
    ) -> Result<ResumeAnalysis, ServiceError> {
        self.log.lock().unwrap().push(format!(
            "resume:{}:{}",
            file.name(),
            username.unwrap_or_default()
        ));
        tokio::time::sleep(self.delay).await;

        if self.fail {
            return Err(ServiceError::Status {
                status: 500,
                body: "resume parser crashed".to_string(),
            });
        }

        Ok(ResumeAnalysis {
            filename: Some(file.name().to_string()),
            size: Some(file.size()),
            extra: serde_json::Map::new(),
        })
    }
}

pub struct FakeProfileService {
    pub log: CallLog,
    pub delay: Duration,
    pub fail: bool,
}

#[async_trait]
impl ProfileAnalysisService for FakeProfileService {
    async fn analyze(&self, username: &str) -> Result<GithubAnalysis, ServiceError> {
        self.log.lock().unwrap().push(format!("profile:{}", username));
        tokio::time::sleep(self.delay).await;

        if self.fail {
            return Err(ServiceError::Reported(format!(
                "No repositories found for {}",
                username
            )));
        }

        Ok(github_analysis(username))
    }
}

pub fn github_analysis(username: &str) -> GithubAnalysis {
    serde_json::from_value(serde_json::json!({
        "username": username,
        "repositories": 8,
        "languages": ["Rust", "TypeScript"],
        "contributions": 120,
        "topProjects": [
            {"repository": "hello-world", "stars": 42, "forks": 3, "language": "Rust"}
        ]
    }))
    .unwrap()
}

/// Fake orchestrator plus the shared call log
pub struct Harness {
    pub log: CallLog,
    pub orchestrator: AnalysisOrchestrator,
}

pub fn harness(resume_fails: bool, profile_fails: bool) -> Harness {
    harness_with_delay(resume_fails, profile_fails, Duration::ZERO)
}

pub fn harness_with_delay(resume_fails: bool, profile_fails: bool, delay: Duration) -> Harness {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));

    let orchestrator = AnalysisOrchestrator::new(
        Arc::new(FakeResumeService {
            log: log.clone(),
            delay,
            fail: resume_fails,
        }),
        Arc::new(FakeProfileService {
            log: log.clone(),
            delay,
            fail: profile_fails,
        }),
    );

    Harness { log, orchestrator }
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn pdf_resume(size: usize) -> ResumeFile {
    ResumeFile::new("resume.pdf", "application/pdf", vec![b'%'; size])
}
