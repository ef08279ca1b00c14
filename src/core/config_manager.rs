// src/core/config_manager.rs
//! Configuration from `config.yaml` plus environment overrides

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::service_client::{ServiceClient, DEFAULT_TIMEOUT_SECS};
use crate::orchestrator::AnalysisOrchestrator;
use crate::web::sessions::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL_SECS};
use crate::utils::resolve_path;

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigManager {
    pub backend_url: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub stage_timeout_seconds: Option<u64>,
    pub export_dir: PathBuf,
    pub session_ttl_seconds: u64,
    pub max_sessions: usize,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000/api".to_string(),
            port: 8080,
            request_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            stage_timeout_seconds: None,
            export_dir: PathBuf::from("exports"),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: Option<ConfigManager>,
    #[serde(default)]
    production: Option<ConfigManager>,
}

impl ConfigManager {
    /// Load `config.yaml` from the working directory (defaults when absent),
    /// then apply `TWIN_*` environment overrides.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let mut config = Self::load_from_file(Path::new(CONFIG_FILE), &environment)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.export_dir = resolve_path(&config.export_dir)?;

        info!(
            backend_url = %config.backend_url,
            port = config.port,
            stage_timeout_seconds = ?config.stage_timeout_seconds,
            "configuration loaded"
        );
        Ok(config)
    }

    fn get_environment() -> String {
        std::env::var("TWIN_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn load_from_file(path: &Path, environment: &str) -> Result<Self> {
        if !path.exists() {
            info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content, environment)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str, environment: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;

        let selected = match environment {
            "production" => file.production,
            _ => file.local,
        };

        Ok(selected.unwrap_or_default())
    }

    fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TWIN_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(port) = lookup("TWIN_PORT") {
            self.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("TWIN_PORT must be a valid port number"))?;
        }
        if let Some(seconds) = lookup("TWIN_STAGE_TIMEOUT_SECS") {
            self.stage_timeout_seconds = Some(
                seconds
                    .parse()
                    .map_err(|_| anyhow::anyhow!("TWIN_STAGE_TIMEOUT_SECS must be a number"))?,
            );
        }
        if let Some(dir) = lookup("TWIN_EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(seconds) = lookup("TWIN_SESSION_TTL_SECS") {
            self.session_ttl_seconds = seconds
                .parse()
                .map_err(|_| anyhow::anyhow!("TWIN_SESSION_TTL_SECS must be a number"))?;
        }
        if let Some(max) = lookup("TWIN_MAX_SESSIONS") {
            self.max_sessions = max
                .parse()
                .map_err(|_| anyhow::anyhow!("TWIN_MAX_SESSIONS must be a number"))?;
        }
        Ok(())
    }

    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_seconds.map(Duration::from_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }

    pub fn service_client(&self) -> Result<ServiceClient> {
        ServiceClient::new(self.backend_url.clone(), self.request_timeout_seconds)
    }

    /// Orchestrator wired to the HTTP backend for both stages
    pub fn orchestrator(&self) -> Result<AnalysisOrchestrator> {
        let client = Arc::new(self.service_client()?);
        Ok(AnalysisOrchestrator::new(client.clone(), client).with_stage_timeout(self.stage_timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const YAML: &str = r#"
local:
  backend_url: http://localhost:8000/api
  port: 9000
production:
  backend_url: https://twin.example.com/api
  stage_timeout_seconds: 120
  export_dir: /app/exports
"#;

    #[test]
    fn test_sections_selected_by_environment() {
        let local = ConfigManager::from_yaml(YAML, "local").unwrap();
        assert_eq!(local.port, 9000);
        assert_eq!(local.stage_timeout(), None);
        assert_eq!(local.request_timeout_seconds, DEFAULT_TIMEOUT_SECS);

        let production = ConfigManager::from_yaml(YAML, "production").unwrap();
        assert_eq!(production.backend_url, "https://twin.example.com/api");
        assert_eq!(production.port, 8080);
        assert_eq!(production.stage_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(production.export_dir, PathBuf::from("/app/exports"));
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let config = ConfigManager::from_yaml("local:\n  port: 1234\n", "production").unwrap();
        assert_eq!(config, ConfigManager::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            ConfigManager::load_from_file(&dir.path().join("config.yaml"), "local").unwrap();
        assert_eq!(config, ConfigManager::default());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TWIN_BACKEND_URL", "http://backend:8000/api"),
            ("TWIN_PORT", "8181"),
            ("TWIN_STAGE_TIMEOUT_SECS", "45"),
            ("TWIN_SESSION_TTL_SECS", "600"),
            ("TWIN_MAX_SESSIONS", "50"),
        ]
        .into_iter()
        .collect();

        let mut config = ConfigManager::default();
        config
            .apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.backend_url, "http://backend:8000/api");
        assert_eq!(config.port, 8181);
        assert_eq!(config.stage_timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.session_ttl(), Duration::from_secs(600));
        assert_eq!(config.max_sessions, 50);
    }

    #[test]
    fn test_invalid_port_override_fails() {
        let mut config = ConfigManager::default();
        let result = config.apply_env_overrides(|key| {
            (key == "TWIN_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }
}
