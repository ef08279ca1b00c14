// src/core/mod.rs
//! Backend access and configuration shared by the web host and the CLI

pub mod config_manager;
pub mod service_client;
pub mod services;

pub use config_manager::ConfigManager;
pub use service_client::ServiceClient;
pub use services::{ProfileAnalysisService, ResumeService};
