use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{NotificationRequest, ViewerQuery};
use crate::routes::{store_error, validation_error, AppState};
use crate::services::Command;

/// Configure notification routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/notifications", web::get().to(list_notifications))
        .route("/notifications", web::post().to(add_notification))
        .route("/notifications/{id}", web::delete().to(remove_notification));
}

/// Live notifications for a user, oldest first
///
/// GET /api/v1/notifications?userId={userId}
async fn list_notifications(
    state: web::Data<AppState>,
    query: web::Query<ViewerQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let notifications = state
        .store
        .read()
        .await
        .notifications_for(&query.user_id, chrono::Utc::now());
    HttpResponse::Ok().json(notifications)
}

/// POST /api/v1/notifications
async fn add_notification(
    state: web::Data<AppState>,
    req: web::Json<NotificationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let NotificationRequest { recipient_id, kind, message } = req.into_inner();
    let command = Command::AddNotification { recipient_id, kind, message };
    let result = state.store.write().await.apply(command, chrono::Utc::now());
    match result {
        Ok(outcome) => HttpResponse::Created().json(outcome),
        Err(e) => store_error(e),
    }
}

/// Dismiss a notification before its display window ends
///
/// DELETE /api/v1/notifications/{id}
async fn remove_notification(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let command = Command::RemoveNotification { id: path.into_inner() };
    let result = state.store.write().await.apply(command, chrono::Utc::now());
    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => store_error(e),
    }
}
