use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use crate::models::ProfileUpdate;
use crate::routes::{error_response, store_error, AppState};
use crate::services::Command;

/// Configure profile pool routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/profiles", web::get().to(list_profiles))
        .route("/profiles/{user_id}", web::get().to(get_profile))
        .route("/profiles/{user_id}", web::patch().to(update_profile));
}

/// GET /api/v1/profiles
async fn list_profiles(state: web::Data<AppState>) -> impl Responder {
    let store = state.store.read().await;
    HttpResponse::Ok().json(store.profiles())
}

/// GET /api/v1/profiles/{userId}
async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let user_id = path.into_inner();
    let store = state.store.read().await;
    match store.profile(&user_id) {
        Some(profile) => HttpResponse::Ok().json(profile),
        None => error_response(
            StatusCode::NOT_FOUND,
            "Not found",
            format!("Profile not found: {}", user_id),
        ),
    }
}

/// Merge a partial profile update
///
/// PATCH /api/v1/profiles/{userId}
async fn update_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ProfileUpdate>,
) -> impl Responder {
    let command = Command::UpdateProfile {
        user_id: path.into_inner(),
        update: req.into_inner(),
    };

    let result = state.store.write().await.apply(command, chrono::Utc::now());
    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => store_error(e),
    }
}
