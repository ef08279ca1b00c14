// src/core/service_client.rs
//! HTTP client for the analysis backend

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{error, info, trace};

use super::services::{ProfileAnalysisService, ResumeService};
use crate::types::response::{BackendHealth, ProjectSummaries, ProjectSummaryText};
use crate::types::{ApiEnvelope, GithubAnalysis, ResumeAnalysis, ServiceError};
use crate::wizard::ResumeFile;

const RESUME_ANALYZE_ENDPOINT: &str = "/resume/analyze";
const GITHUB_ANALYZE_ENDPOINT: &str = "/github/analyze";
const GITHUB_SUMMARIES_ENDPOINT: &str = "/github/summaries";
const GITHUB_SUMMARY_ENDPOINT: &str = "/github/summary";
const HEALTH_ENDPOINT: &str = "/health";

pub const DEFAULT_TIMEOUT_SECS: u64 = 400;
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
}

impl ServiceClient {
    pub fn new(base_url: String, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout: Duration::from_secs(HEALTH_TIMEOUT_SECS),
        })
    }

    /// Health checks use their own, shorter timeout than the analysis calls
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Resume upload: multipart `resume` file plus optional `username`
    pub async fn submit_resume(
        &self,
        file: &ResumeFile,
        username: Option<&str>,
    ) -> Result<ResumeAnalysis, ServiceError> {
        let url = self.url(RESUME_ANALYZE_ENDPOINT);

        let part = Part::bytes(file.content.to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| ServiceError::Transport {
                url: url.clone(),
                reason: format!("invalid content type: {}", e),
            })?;

        let mut form = Form::new().part("resume", part);
        if let Some(username) = username {
            form = form.text("username", username.to_string());
        }

        info!("Uploading resume {} ({} bytes) to {}", file.name(), file.size(), url);

        self.send(self.client.post(&url).multipart(form), &url).await
    }

    /// Profile analysis: JSON `{username}`
    pub async fn analyze_profile(&self, username: &str) -> Result<GithubAnalysis, ServiceError> {
        let url = self.url(GITHUB_ANALYZE_ENDPOINT);
        let payload = serde_json::json!({ "username": username });

        info!("Requesting GitHub analysis for {} from {}", username, url);

        self.send(self.client.post(&url).json(&payload), &url).await
    }

    pub async fn project_summaries(&self, username: &str) -> Result<ProjectSummaries, ServiceError> {
        let url = format!("{}/{}", self.url(GITHUB_SUMMARIES_ENDPOINT), username);
        self.send(self.client.get(&url), &url).await
    }

    pub async fn project_summary(
        &self,
        username: &str,
        project: &str,
    ) -> Result<ProjectSummaryText, ServiceError> {
        let url = format!("{}/{}/{}", self.url(GITHUB_SUMMARY_ENDPOINT), username, project);
        self.send(self.client.get(&url), &url).await
    }

    /// Health is a bare object, not an envelope
    pub async fn health(&self) -> Result<BackendHealth, ServiceError> {
        let url = self.url(HEALTH_ENDPOINT);
        let request = self.client.get(&url).timeout(self.health_timeout);
        let body = self.fetch_body(request, &url).await?;

        serde_json::from_str(&body).map_err(|e| ServiceError::Malformed(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, ServiceError> {
        let body = self.fetch_body(request, url).await?;

        let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
            error!("Unparseable response from {}: {}", url, body);
            ServiceError::Malformed(e.to_string())
        })?;

        envelope.into_result()
    }

    async fn fetch_body(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<String, ServiceError> {
        let response = request.send().await.map_err(|e| ServiceError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        trace!("Response status from {}: {}", url, status);

        let body = response.text().await.map_err(|e| ServiceError::Transport {
            url: url.to_string(),
            reason: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            error!("Backend error response from {}: {} {}", url, status, body);
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        Ok(body)
    }
}

/// Prefer the envelope's `error` text over the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.error.or(envelope.message))
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}

#[async_trait]
impl ResumeService for ServiceClient {
    async fn submit(
        &self,
        file: &ResumeFile,
        username: Option<&str>,
    ) -> Result<ResumeAnalysis, ServiceError> {
        self.submit_resume(file, username).await
    }
}

#[async_trait]
impl ProfileAnalysisService for ServiceClient {
    async fn analyze(&self, username: &str) -> Result<GithubAnalysis, ServiceError> {
        self.analyze_profile(username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = ServiceClient::new("http://localhost:8000/api/".to_string(), 5).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.url(GITHUB_ANALYZE_ENDPOINT),
            "http://localhost:8000/api/github/analyze"
        );
    }

    #[test]
    fn test_error_message_prefers_envelope_error() {
        assert_eq!(
            error_message(r#"{"success": false, "error": "Username is required"}"#),
            "Username is required"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(""), "Unknown error");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections
        let client = ServiceClient::new("http://127.0.0.1:9/api".to_string(), 2).unwrap();

        let err = client.analyze_profile("octocat").await.unwrap_err();
        assert!(matches!(err, ServiceError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_health_gives_up_on_silent_backend() {
        // Accepts connections (via the backlog) but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let client = ServiceClient::new(format!("http://127.0.0.1:{}/api", port), DEFAULT_TIMEOUT_SECS)
            .unwrap()
            .with_health_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let err = client.health().await.unwrap_err();

        assert!(matches!(err, ServiceError::Transport { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }
}
