// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::core::ConfigManager;
use crate::utils::{base_file_name, mime_type_for};
use crate::web::start_web_server;
use crate::wizard::{ResumeFile, WizardSession, WizardState};

#[derive(Parser)]
#[command(name = "twin")]
#[command(about = "Collect a resume and a GitHub handle into a digital twin profile")]
pub struct TwinCli {
    #[command(subcommand)]
    pub command: TwinCommand,

    /// Override the analysis backend base URL
    #[arg(long, global = true)]
    pub backend_url: Option<String>,
}

#[derive(Subcommand)]
pub enum TwinCommand {
    /// Start the web wizard host
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run the wizard from the terminal
    Analyze {
        #[arg(long)]
        username: String,
        /// PDF, DOC or DOCX resume; the resume step is skipped when absent
        #[arg(long)]
        resume: Option<PathBuf>,
        /// Write the export artifact into the configured export directory
        #[arg(long)]
        export: bool,
    },
    /// Check backend health
    Health,
    /// List stored project summaries for a user
    Summaries { username: String },
    /// Show one stored project summary
    Summary { username: String, project: String },
}

pub async fn handle_command(cli: TwinCli, mut config: ConfigManager) -> Result<()> {
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }

    match cli.command {
        TwinCommand::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            start_web_server(config).await
        }

        TwinCommand::Analyze {
            username,
            resume,
            export,
        } => run_analysis(&config, &username, resume.as_deref(), export).await,

        TwinCommand::Health => {
            let client = config.service_client()?;
            match client.health().await {
                Ok(health) => {
                    println!("✅ Backend {} is {}", config.backend_url, health.status);
                    println!("   GitHub token configured: {}", health.github_token_configured);
                    println!("   OpenRouter configured: {}", health.openrouter_configured);
                }
                Err(e) => {
                    error!("Backend health check failed: {}", e);
                    println!("❌ Backend {} unreachable: {}", config.backend_url, e);
                }
            }
            Ok(())
        }

        TwinCommand::Summaries { username } => {
            let client = config.service_client()?;
            let summaries = client.project_summaries(&username).await?;

            if summaries.summaries.is_empty() {
                println!("No project summaries stored for {}.", summaries.username);
            } else {
                println!("{:<30} {:<15} {:>7}", "Project", "Language", "Stars");
                println!("{}", "-".repeat(54));
                for project in &summaries.summaries {
                    println!(
                        "{:<30} {:<15} {:>7}",
                        project.repository,
                        project.language.as_deref().unwrap_or("-"),
                        project.stars
                    );
                }
            }
            Ok(())
        }

        TwinCommand::Summary { username, project } => {
            let client = config.service_client()?;
            let summary = client.project_summary(&username, &project).await?;
            println!("{}", summary.content);
            Ok(())
        }
    }
}

async fn run_analysis(
    config: &ConfigManager,
    username: &str,
    resume: Option<&Path>,
    export: bool,
) -> Result<()> {
    let orchestrator = Arc::new(config.orchestrator()?);
    let mut session = WizardSession::new(orchestrator);

    match resume {
        Some(path) => {
            let file = load_resume(path).await?;
            info!(file_name = %file.name(), size = file.size(), "resume loaded");
            session.submit_resume(file)?;
        }
        None => {
            session.skip_resume()?;
        }
    }

    session.submit_username(username).await?;
    print_summary(session.state());

    if export {
        let artifact = session.export()?;
        let path = artifact.write_to(&config.export_dir).await?;
        println!("✓ Export written to {}", path.display());
    }

    Ok(())
}

async fn load_resume(path: &Path) -> Result<ResumeFile> {
    let name = base_file_name(&path.to_string_lossy());
    let mime_type = mime_type_for(&name)
        .with_context(|| format!("Cannot infer a resume type from {}", path.display()))?;

    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read resume: {}", path.display()))?;

    Ok(ResumeFile::new(name, mime_type, content))
}

fn print_summary(state: &WizardState) {
    let Some(github) = &state.github_analysis else {
        return;
    };

    println!("✓ Analysis complete for {}", github.username);
    println!("   Repositories: {}", github.repositories);
    println!("   Contributions: {}", github.contributions);
    if !github.languages.is_empty() {
        println!("   Languages: {}", github.languages.join(", "));
    }
    for project in &github.top_projects {
        println!("   ★ {:<5} {}", project.stars, project.repository);
    }

    match &state.resume_analysis {
        Some(resume) => println!(
            "   Resume: analyzed ({})",
            resume.filename.as_deref().unwrap_or("unnamed")
        ),
        None => println!("   Resume: not analyzed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_analyze_command() {
        let cli = TwinCli::try_parse_from([
            "twin",
            "analyze",
            "--username",
            "octocat",
            "--resume",
            "cv.pdf",
            "--export",
        ])
        .unwrap();

        match cli.command {
            TwinCommand::Analyze {
                username,
                resume,
                export,
            } => {
                assert_eq!(username, "octocat");
                assert_eq!(resume, Some(PathBuf::from("cv.pdf")));
                assert!(export);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_global_backend_url() {
        let cli = TwinCli::try_parse_from([
            "twin",
            "summary",
            "octocat",
            "hello-world",
            "--backend-url",
            "http://backend:8000/api",
        ])
        .unwrap();

        assert_eq!(cli.backend_url.as_deref(), Some("http://backend:8000/api"));
        assert!(matches!(cli.command, TwinCommand::Summary { .. }));
    }

    #[tokio::test]
    async fn test_load_resume_infers_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"docx bytes")
            .unwrap();

        let file = load_resume(&path).await.unwrap();

        assert_eq!(file.name(), "resume.docx");
        assert_eq!(file.size(), 10);
        assert_eq!(file.mime_type(), crate::upload_validator::DOCX_MIME);
    }

    #[tokio::test]
    async fn test_load_resume_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, b"plain").unwrap();

        assert!(load_resume(&path).await.is_err());
    }
}
