// src/types/response.rs
use serde::{Deserialize, Serialize};

use super::errors::ServiceError;

// ===== Backend Envelope =====

/// Body shape shared by every backend endpoint. `success` is authoritative
/// even when the HTTP status is 2xx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_result(self) -> Result<T, ServiceError> {
        if !self.success {
            let reason = self
                .error
                .or(self.message)
                .unwrap_or_else(|| "service reported failure".to_string());
            return Err(ServiceError::Reported(reason));
        }

        self.data
            .ok_or_else(|| ServiceError::Malformed("success response without data".to_string()))
    }
}

// ===== Stage Payloads =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubAnalysis {
    pub username: String,
    #[serde(default)]
    pub repositories: u64,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub contributions: u64,
    #[serde(default)]
    pub top_projects: Vec<TopProject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProject {
    pub repository: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub forks: u64,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
}

// ===== Supplementary Endpoints =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub github_token_configured: bool,
    #[serde(default)]
    pub openrouter_configured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummaries {
    pub username: String,
    #[serde(default)]
    pub summaries: Vec<TopProject>,
    #[serde(default)]
    pub statistics: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummaryText {
    pub username: String,
    pub project: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_false_is_reported_even_with_data() {
        let body = r#"{"success": false, "error": "OpenRouter API key not configured", "data": null}"#;
        let envelope: ApiEnvelope<GithubAnalysis> = serde_json::from_str(body).unwrap();

        match envelope.into_result() {
            Err(ServiceError::Reported(reason)) => {
                assert_eq!(reason, "OpenRouter API key not configured")
            }
            other => panic!("expected reported failure, got {:?}", other),
        }
    }

    #[test]
    fn test_success_without_data_is_malformed() {
        let envelope: ApiEnvelope<ResumeAnalysis> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(
            envelope.into_result(),
            Err(ServiceError::Malformed(_))
        ));
    }

    #[test]
    fn test_github_analysis_parses_backend_payload() {
        let body = r#"{
            "success": true,
            "message": "GitHub analysis completed successfully",
            "data": {
                "username": "octocat",
                "repositories": 8,
                "topProjects": [{"repository": "hello-world", "stars": 42, "topics": []}],
                "languages": ["Ruby", "CSS"],
                "contributions": 120,
                "statistics": {"total_repositories": 8},
                "output_directory": "project_summaries/octocat",
                "summary_files": 8
            }
        }"#;

        let analysis = serde_json::from_str::<ApiEnvelope<GithubAnalysis>>(body)
            .unwrap()
            .into_result()
            .unwrap();

        assert_eq!(analysis.username, "octocat");
        assert_eq!(analysis.repositories, 8);
        assert_eq!(analysis.languages, vec!["Ruby", "CSS"]);
        assert_eq!(analysis.top_projects[0].repository, "hello-world");
        assert_eq!(analysis.top_projects[0].stars, 42);
    }

    #[test]
    fn test_resume_analysis_keeps_unknown_fields() {
        let analysis: ResumeAnalysis =
            serde_json::from_str(r#"{"filename": "resume.pdf", "size": 512000, "pages": 2}"#)
                .unwrap();

        assert_eq!(analysis.filename.as_deref(), Some("resume.pdf"));
        assert_eq!(analysis.size, Some(512000));
        assert_eq!(analysis.extra.get("pages"), Some(&serde_json::json!(2)));
    }
}
