// Route exports
pub mod backend;
pub mod discovery;
pub mod matches;
pub mod notifications;
pub mod profiles;

use actix_web::{error, http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::models::{ErrorResponse, HealthResponse};
use crate::services::{AppStore, BackendError, CacheManager, PersistenceBackend, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<AppStore>>,
    pub backend: Arc<dyn PersistenceBackend>,
    pub cache: Arc<CacheManager>,
    pub discovery_limit: usize,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(discovery::configure)
            .configure(profiles::configure)
            .configure(matches::configure)
            .configure(notifications::configure)
            .configure(backend::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.backend.name().to_string(),
        cache: state.cache.stats(),
        timestamp: chrono::Utc::now(),
    })
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code: status.as_u16(),
    })
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let response = error_response(StatusCode::BAD_REQUEST, "invalid_json", format!("Invalid JSON: {}", err));
    error::InternalError::from_response(err, response).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    let response = error_response(StatusCode::BAD_REQUEST, "invalid_query", format!("Invalid query: {}", err));
    error::InternalError::from_response(err, response).into()
}

pub(crate) fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: field_errors={:?}", errors);
    error_response(StatusCode::BAD_REQUEST, "Validation failed", errors)
}

pub(crate) fn store_error(err: StoreError) -> HttpResponse {
    let (status, error) = match &err {
        StoreError::ProfileNotFound(_)
        | StoreError::MatchNotFound(_)
        | StoreError::NotificationNotFound(_)
        | StoreError::Resolve(_) => (StatusCode::NOT_FOUND, "Not found"),
        StoreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
        StoreError::Session(_) => (StatusCode::CONFLICT, "Already decided"),
    };
    tracing::debug!("Command rejected: {}", err);
    error_response(status, error, err)
}

pub(crate) fn backend_error(err: BackendError) -> HttpResponse {
    match &err {
        BackendError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Not found", err),
        BackendError::InvalidInput(_) => error_response(StatusCode::BAD_REQUEST, "Invalid input", err),
        _ => {
            tracing::error!("Backend failure: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Backend failure", err)
        }
    }
}
