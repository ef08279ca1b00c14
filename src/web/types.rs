// src/web/types.rs
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};
use uuid::Uuid;

use crate::types::response::BackendHealth;
use crate::types::{GithubAnalysis, OrchestrationError, ResumeAnalysis, WizardError};
use crate::upload_validator::FileMeta;
use crate::wizard::{WizardState, WizardStep};

#[derive(FromForm)]
pub struct ResumeUploadForm<'f> {
    pub resume: TempFile<'f>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct UsernameRequest {
    pub username: String,
}

/// What the browser sees of a session. The resume content never leaves the
/// server.
#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct WizardStateView {
    pub session_id: String,
    pub current_step: u8,
    pub step: WizardStep,
    pub resume_file: Option<FileMeta>,
    pub resume_analysis: Option<ResumeAnalysis>,
    pub github_username: Option<String>,
    pub github_analysis: Option<GithubAnalysis>,
    pub is_processing: bool,
}

impl WizardStateView {
    pub fn new(session_id: Uuid, state: &WizardState) -> Self {
        Self {
            session_id: session_id.to_string(),
            current_step: state.current_step.number(),
            step: state.current_step,
            resume_file: state.resume_file.as_ref().map(|f| f.meta.clone()),
            resume_analysis: state.resume_analysis.clone(),
            github_username: state.github_username.clone(),
            github_analysis: state.github_analysis.clone(),
            is_processing: state.is_processing,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthData {
    pub status: String,
    pub active_sessions: usize,
    pub backend_url: String,
    pub backend_reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_error: Option<String>,
}

/// JSON body served as a file download
pub struct JsonAttachment {
    pub body: String,
    pub filename: String,
}

impl<'r> Responder<'r, 'static> for JsonAttachment {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(ContentType::JSON)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .sized_body(self.body.len(), std::io::Cursor::new(self.body))
            .ok()
    }
}

// STANDARD RESPONSE TYPES

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
}

impl ActionResponse {
    pub fn success(message: String, action: String) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

pub type ApiError = (Status, Json<StandardErrorResponse>);

pub type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;

pub fn api_error(status: Status, error: String, code: &str, suggestions: Vec<String>) -> ApiError {
    (
        status,
        Json(StandardErrorResponse::new(error, code.to_string(), suggestions)),
    )
}

/// Validation problems are 422, step-order problems 409, backend failures 502
pub fn wizard_error(err: &WizardError) -> ApiError {
    let status = match err {
        WizardError::Upload(_) | WizardError::Username(_) => Status::UnprocessableEntity,
        WizardError::InvalidTransition { .. }
        | WizardError::AlreadyProcessing
        | WizardError::NotReady
        | WizardError::StaleResult
        | WizardError::Analysis(OrchestrationError::MissingUsername) => Status::Conflict,
        WizardError::Analysis(OrchestrationError::ProfileAnalysis(_)) => Status::BadGateway,
    };

    api_error(status, err.to_string(), err.code(), err.suggestions())
}
