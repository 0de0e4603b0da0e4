use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{SendMessageRequest, ViewerQuery};
use crate::routes::{store_error, validation_error, AppState};
use crate::services::Command;

/// Configure match and chat routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/matches", web::get().to(list_matches))
        .route("/matches/{match_id}/read", web::post().to(mark_read))
        .route("/matches/{match_id}/messages", web::get().to(list_messages))
        .route("/matches/{match_id}/messages", web::post().to(send_message));
}

/// Matches involving a user
///
/// GET /api/v1/matches?userId={userId}
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<ViewerQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let matches = state.store.read().await.matches_for(&query.user_id);
    HttpResponse::Ok().json(serde_json::json!({
        "userId": query.user_id,
        "matches": matches,
        "count": matches.len(),
    }))
}

/// Clear the unread flag of a match for the reader
///
/// POST /api/v1/matches/{matchId}/read?userId={userId}
async fn mark_read(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ViewerQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let command = Command::MarkRead {
        match_id: path.into_inner(),
        reader_id: query.into_inner().user_id,
    };
    let result = state.store.write().await.apply(command, chrono::Utc::now());
    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => store_error(e),
    }
}

/// GET /api/v1/matches/{matchId}/messages
async fn list_messages(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let match_id = path.into_inner();
    let result = state.store.read().await.messages_for(&match_id);
    match result {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => store_error(e),
    }
}

/// Send a chat message within a match
///
/// POST /api/v1/matches/{matchId}/messages
///
/// Request body:
/// ```json
/// {
///   "senderId": "string",
///   "text": "string"
/// }
/// ```
async fn send_message(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<SendMessageRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let SendMessageRequest { sender_id, text } = req.into_inner();
    let command = Command::SendMessage {
        match_id: path.into_inner(),
        sender_id,
        text,
    };
    let result = state.store.write().await.apply(command, chrono::Utc::now());
    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => store_error(e),
    }
}
