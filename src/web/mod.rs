// src/web/mod.rs
//! Rocket host exposing the wizard to a browser, one session per visitor

pub mod handlers;
pub mod sessions;
pub mod types;

pub use handlers::*;
pub use sessions::SessionStore;
pub use types::*;

use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

use crate::core::{ConfigManager, ServiceClient};
use crate::orchestrator::AnalysisOrchestrator;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new(
            "Access-Control-Expose-Headers",
            "Content-Disposition",
        ));
    }
}

#[post("/sessions")]
pub async fn create_session(store: &State<SessionStore>) -> ApiResult<WizardStateView> {
    handlers::create_session_handler(store).await
}

#[get("/sessions/<id>")]
pub async fn get_session(id: &str, store: &State<SessionStore>) -> ApiResult<WizardStateView> {
    handlers::get_session_handler(id, store).await
}

#[post("/sessions/<id>/resume", data = "<upload>")]
pub async fn upload_resume(
    id: &str,
    upload: Form<ResumeUploadForm<'_>>,
    store: &State<SessionStore>,
) -> ApiResult<WizardStateView> {
    handlers::upload_resume_handler(id, upload, store).await
}

#[post("/sessions/<id>/skip-resume")]
pub async fn skip_resume(id: &str, store: &State<SessionStore>) -> ApiResult<WizardStateView> {
    handlers::skip_resume_handler(id, store).await
}

#[post("/sessions/<id>/github", data = "<request>")]
pub async fn submit_username(
    id: &str,
    request: Json<UsernameRequest>,
    store: &State<SessionStore>,
    orchestrator: &State<AnalysisOrchestrator>,
) -> ApiResult<WizardStateView> {
    handlers::submit_username_handler(id, request, store, orchestrator).await
}

#[post("/sessions/<id>/reset")]
pub async fn reset_session(id: &str, store: &State<SessionStore>) -> ApiResult<WizardStateView> {
    handlers::reset_session_handler(id, store).await
}

#[get("/sessions/<id>/export")]
pub async fn export_session(
    id: &str,
    store: &State<SessionStore>,
) -> Result<JsonAttachment, ApiError> {
    handlers::export_session_handler(id, store).await
}

#[delete("/sessions/<id>")]
pub async fn delete_session(
    id: &str,
    store: &State<SessionStore>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_session_handler(id, store).await
}

#[get("/health")]
pub async fn health(
    store: &State<SessionStore>,
    client: &State<ServiceClient>,
) -> Json<DataResponse<HealthData>> {
    handlers::health_handler(store, client).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
    ))
}

#[rocket::catch(413)]
pub fn payload_too_large() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "File size exceeds 10MB limit".to_string(),
        "FILE_TOO_LARGE".to_string(),
        vec!["Use a smaller file size (max 10MB)".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "UNPROCESSABLE".to_string(),
        vec!["Verify all required fields are present".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the server without launching it. Uploads may exceed 10MB a little
/// so the resume validator, not the form parser, reports oversize files.
pub fn build_rocket(
    config: &ConfigManager,
    orchestrator: AnalysisOrchestrator,
) -> Result<Rocket<Build>> {
    let limits = Limits::default()
        .limit("file", 12.mebibytes())
        .limit("data-form", 12.mebibytes());

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.port))
        .merge(("limits", limits));

    let sessions = SessionStore::with_limits(config.session_ttl(), config.max_sessions);

    let rocket = rocket::custom(figment)
        .attach(Cors)
        .manage(config.service_client()?)
        .manage(sessions)
        .manage(orchestrator)
        .register(
            "/api",
            catchers![
                bad_request,
                not_found,
                payload_too_large,
                unprocessable,
                internal_error
            ],
        )
        .mount(
            "/api",
            routes![
                create_session,
                get_session,
                upload_resume,
                skip_resume,
                submit_username,
                reset_session,
                export_session,
                delete_session,
                health,
                options,
            ],
        );

    Ok(rocket)
}

pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let orchestrator = config.orchestrator()?;

    info!("Starting digital twin intake server");
    info!("Backend: {}", config.backend_url);
    info!("Server: http://0.0.0.0:{}", config.port);
    match config.stage_timeout() {
        Some(limit) => info!("Stage timeout: {:?}", limit),
        None => info!("Stage timeout: none"),
    }

    info!(
        "Sessions: idle timeout {}s, limit {}",
        config.session_ttl_seconds, config.max_sessions
    );

    let _rocket = build_rocket(&config, orchestrator)?
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {}", e))?;

    Ok(())
}
