// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

use crate::core::ServiceClient;
use crate::web::sessions::SessionStore;
use crate::web::types::*;

pub async fn health_handler(
    store: &State<SessionStore>,
    client: &State<ServiceClient>,
) -> Json<DataResponse<HealthData>> {
    let (backend, backend_error) = match client.health().await {
        Ok(health) => (Some(health), None),
        Err(e) => {
            warn!("Backend health check failed: {}", e);
            (None, Some(e.to_string()))
        }
    };

    let data = HealthData {
        status: "OK".to_string(),
        active_sessions: store.len().await,
        backend_url: client.base_url().to_string(),
        backend_reachable: backend.is_some(),
        backend,
        backend_error,
    };

    info!(
        backend_reachable = data.backend_reachable,
        active_sessions = data.active_sessions,
        "health check"
    );

    Json(DataResponse::success("Service healthy".to_string(), data))
}
