// src/web/handlers/wizard_handlers.rs
//! Session-scoped wizard handlers

use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::exporter::ResultExporter;
use crate::orchestrator::AnalysisOrchestrator;
use crate::types::WizardError;
use crate::upload_validator::{FileMeta, UploadValidator};
use crate::utils::{base_file_name, mime_type_for, remove_scratch_file};
use crate::web::sessions::{SessionError, SessionStore};
use crate::web::types::*;
use crate::wizard::{ResumeFile, WizardEvent};

fn parse_session_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| {
        api_error(
            Status::BadRequest,
            format!("Invalid session id: {}", id),
            "INVALID_SESSION_ID",
            vec!["Create a new session with POST /api/sessions".to_string()],
        )
    })
}

fn session_error(err: SessionError) -> ApiError {
    match err {
        SessionError::NotFound(id) => api_error(
            Status::NotFound,
            format!("Session {} not found", id),
            "SESSION_NOT_FOUND",
            vec!["Create a new session with POST /api/sessions".to_string()],
        ),
        SessionError::LimitReached(max) => api_error(
            Status::ServiceUnavailable,
            format!("Too many active sessions (limit {})", max),
            "SESSION_LIMIT_REACHED",
            vec!["Try again in a few minutes".to_string()],
        ),
        SessionError::Wizard(e) => wizard_error(&e),
    }
}

fn state_response(
    message: &str,
    session_id: Uuid,
    state: &crate::wizard::WizardState,
) -> Json<DataResponse<WizardStateView>> {
    Json(DataResponse::success(
        message.to_string(),
        WizardStateView::new(session_id, state),
    ))
}

pub async fn create_session_handler(store: &State<SessionStore>) -> ApiResult<WizardStateView> {
    let (session_id, state) = store.create().await.map_err(session_error)?;
    Ok(state_response("Session created", session_id, &state))
}

pub async fn get_session_handler(id: &str, store: &State<SessionStore>) -> ApiResult<WizardStateView> {
    let session_id = parse_session_id(id)?;
    let state = store.get(session_id).await.map_err(session_error)?;
    Ok(state_response("Session state", session_id, &state))
}

pub async fn upload_resume_handler(
    id: &str,
    mut upload: Form<ResumeUploadForm<'_>>,
    store: &State<SessionStore>,
) -> ApiResult<WizardStateView> {
    let session_id = parse_session_id(id)?;

    let file_name = upload
        .resume
        .raw_name()
        .map(|name| base_file_name(name.dangerous_unsafe_unsanitized_raw().as_str()))
        .unwrap_or_else(|| "resume".to_string());

    // Browsers send octet-stream when they cannot tell; fall back to the extension
    let mime_type = match upload.resume.content_type() {
        Some(ct) if !(ct.top() == "application" && ct.sub() == "octet-stream") => {
            format!("{}/{}", ct.top(), ct.sub())
        }
        _ => mime_type_for(&file_name)
            .unwrap_or("application/octet-stream")
            .to_string(),
    };

    info!(
        session_id = %session_id,
        file_name = %file_name,
        mime_type = %mime_type,
        size = upload.resume.len(),
        "resume upload received"
    );

    // Reject on metadata before touching the content
    let meta = FileMeta::new(file_name.clone(), upload.resume.len(), mime_type.clone());
    UploadValidator::validate(&meta).map_err(|r| wizard_error(&WizardError::Upload(r)))?;

    let temp_path = std::env::temp_dir().join(format!("resume_upload_{}", Uuid::new_v4()));
    if let Err(e) = upload.resume.persist_to(&temp_path).await {
        error!("Failed to save uploaded file: {}", e);
        return Err(api_error(
            Status::InternalServerError,
            "Failed to process uploaded file".to_string(),
            "FILE_SAVE_ERROR",
            vec!["Try uploading the file again".to_string()],
        ));
    }

    let content = tokio::fs::read(&temp_path).await;
    remove_scratch_file(&temp_path).await;
    let content = content.map_err(|e| {
        error!("Failed to read uploaded file: {}", e);
        api_error(
            Status::InternalServerError,
            "Failed to process uploaded file".to_string(),
            "FILE_READ_ERROR",
            vec!["Try uploading the file again".to_string()],
        )
    })?;

    let file = ResumeFile::new(file_name, mime_type, content);
    let state = store
        .apply(session_id, WizardEvent::SubmitResume(file))
        .await
        .map_err(session_error)?;

    Ok(state_response("Resume accepted", session_id, &state))
}

pub async fn skip_resume_handler(id: &str, store: &State<SessionStore>) -> ApiResult<WizardStateView> {
    let session_id = parse_session_id(id)?;
    let state = store
        .apply(session_id, WizardEvent::SkipResume)
        .await
        .map_err(session_error)?;

    Ok(state_response("Resume step skipped", session_id, &state))
}

pub async fn submit_username_handler(
    id: &str,
    request: Json<UsernameRequest>,
    store: &State<SessionStore>,
    orchestrator: &State<AnalysisOrchestrator>,
) -> ApiResult<WizardStateView> {
    let session_id = parse_session_id(id)?;
    let request = request.into_inner();

    let snapshot = store
        .apply(session_id, WizardEvent::SubmitUsername(request.username))
        .await
        .map_err(session_error)?;

    let run_id = snapshot.run_id.ok_or_else(|| {
        error!("Session {} is processing without a run id", session_id);
        api_error(
            Status::InternalServerError,
            "Analysis could not be started".to_string(),
            "RUN_NOT_STARTED",
            vec!["Try again in a few moments".to_string()],
        )
    })?;

    let span = info_span!("analysis_request", session_id = %session_id, run_id = %run_id);
    let result = orchestrator.run(&snapshot).instrument(span).await;

    match result {
        Ok(outcome) => {
            let state = store
                .apply(session_id, WizardEvent::AnalysisSucceeded { run_id, outcome })
                .await
                .map_err(|e| {
                    warn!(
                        "Discarding analysis result of run {} for session {}: {}",
                        run_id, session_id, e
                    );
                    session_error(e)
                })?;

            Ok(state_response(
                "GitHub analysis completed successfully",
                session_id,
                &state,
            ))
        }
        Err(e) => {
            error!("Analysis failed for session {}: {}", session_id, e);
            if let Err(late) = store
                .apply(session_id, WizardEvent::AnalysisFailed { run_id })
                .await
            {
                warn!(
                    "Discarding failure of run {} for session {}: {}",
                    run_id, session_id, late
                );
            }
            Err(wizard_error(&WizardError::Analysis(e)))
        }
    }
}

pub async fn reset_session_handler(id: &str, store: &State<SessionStore>) -> ApiResult<WizardStateView> {
    let session_id = parse_session_id(id)?;
    let state = store
        .apply(session_id, WizardEvent::Reset)
        .await
        .map_err(session_error)?;

    Ok(state_response("Wizard reset", session_id, &state))
}

pub async fn export_session_handler(
    id: &str,
    store: &State<SessionStore>,
) -> Result<JsonAttachment, ApiError> {
    let session_id = parse_session_id(id)?;
    let state = store.get(session_id).await.map_err(session_error)?;

    let artifact = ResultExporter::export(&state).map_err(|e| wizard_error(&e))?;
    let body = artifact.to_json().map_err(|e| {
        error!("Failed to serialize export: {}", e);
        api_error(
            Status::InternalServerError,
            "Failed to build export".to_string(),
            "EXPORT_ERROR",
            vec!["Try again in a few moments".to_string()],
        )
    })?;

    Ok(JsonAttachment {
        body,
        filename: artifact.file_name(),
    })
}

pub async fn delete_session_handler(
    id: &str,
    store: &State<SessionStore>,
) -> Result<Json<ActionResponse>, ApiError> {
    let session_id = parse_session_id(id)?;

    if !store.remove(session_id).await {
        return Err(session_error(SessionError::NotFound(session_id)));
    }

    Ok(Json(ActionResponse::success(
        format!("Session {} deleted", session_id),
        "deleted".to_string(),
    )))
}
