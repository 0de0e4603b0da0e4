use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    DecisionRequest, NextCandidateResponse, QueueResponse, ResetRequest, UpdatePreferencesRequest,
    Verdict, ViewerQuery,
};
use crate::routes::{store_error, validation_error, AppState};
use crate::services::Command;

/// Configure discovery and preference routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/discovery/queue", web::get().to(get_queue))
        .route("/discovery/next", web::get().to(next_candidate))
        .route("/discovery/decide", web::post().to(decide))
        .route("/discovery/reset", web::post().to(reset))
        .route("/preferences", web::get().to(get_preferences))
        .route("/preferences", web::put().to(update_preferences));
}

/// Candidate queue for a viewer
///
/// GET /api/v1/discovery/queue?userId={userId}&limit={limit}
async fn get_queue(
    state: web::Data<AppState>,
    query: web::Query<ViewerQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let store = state.store.read().await;
    let all = store.queue(&query.user_id, None);
    let total_remaining = all.len();
    let candidates = match query.limit {
        Some(limit) => all.into_iter().take(limit as usize).collect(),
        None => all,
    };

    tracing::debug!(
        "Queue for {}: returning {} of {} candidates",
        query.user_id,
        candidates.len(),
        total_remaining
    );

    HttpResponse::Ok().json(QueueResponse {
        candidates,
        total_remaining,
    })
}

/// Current head of the viewer's queue
///
/// GET /api/v1/discovery/next?userId={userId}
async fn next_candidate(
    state: web::Data<AppState>,
    query: web::Query<ViewerQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let candidate = state.store.read().await.current_candidate(&query.user_id);
    HttpResponse::Ok().json(NextCandidateResponse {
        exhausted: candidate.is_none(),
        candidate,
    })
}

/// Submit a swipe decision
///
/// POST /api/v1/discovery/decide
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "candidateId": "string",
///   "verdict": "like|pass"
/// }
/// ```
async fn decide(
    state: web::Data<AppState>,
    req: web::Json<DecisionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let DecisionRequest { user_id, candidate_id, verdict } = req.into_inner();
    let command = match verdict {
        Verdict::Like => Command::Like { viewer_id: user_id, candidate_id },
        Verdict::Pass => Command::Pass { viewer_id: user_id, candidate_id },
    };

    let result = state.store.write().await.apply(command, chrono::Utc::now());
    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => store_error(e),
    }
}

/// Forget the viewer's decisions so every profile can be reviewed again
///
/// POST /api/v1/discovery/reset
async fn reset(
    state: web::Data<AppState>,
    req: web::Json<ResetRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let command = Command::ResetDiscovery { viewer_id: req.into_inner().user_id };
    let result = state.store.write().await.apply(command, chrono::Utc::now());
    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => store_error(e),
    }
}

/// GET /api/v1/preferences?userId={userId}
async fn get_preferences(
    state: web::Data<AppState>,
    query: web::Query<ViewerQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let store = state.store.read().await;
    HttpResponse::Ok().json(store.preferences(&query.user_id))
}

/// Merge a partial preferences update
///
/// PUT /api/v1/preferences
async fn update_preferences(
    state: web::Data<AppState>,
    req: web::Json<UpdatePreferencesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let UpdatePreferencesRequest { user_id, update } = req.into_inner();
    let result = state
        .store
        .write()
        .await
        .apply(Command::UpdatePreferences { viewer_id: user_id, update }, chrono::Utc::now());
    match result {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => store_error(e),
    }
}
