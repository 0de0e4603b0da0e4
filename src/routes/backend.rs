use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    BackendMessageRequest, LikeRequest, LikeResponse, Match, MatchQuery, ProfileUpdate, UserProfile,
    ViewerQuery,
};
use crate::routes::{backend_error, validation_error, AppState};
use crate::services::CacheKey;

/// Configure the persistence-backend routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/backend")
            .route("/profiles", web::post().to(create_profile))
            .route("/profiles/{user_id}", web::get().to(get_profile))
            .route("/profiles/{user_id}", web::patch().to(update_profile))
            .route("/discovery", web::get().to(discovery_users))
            .route("/likes", web::post().to(record_like))
            .route("/matches", web::get().to(user_matches))
            .route("/messages", web::post().to(send_message))
            .route("/messages", web::get().to(list_messages)),
    );
}

/// POST /api/v1/backend/profiles
async fn create_profile(
    state: web::Data<AppState>,
    req: web::Json<UserProfile>,
) -> impl Responder {
    let profile = req.into_inner();
    if profile.user_id.is_empty() {
        return backend_error(crate::services::BackendError::InvalidInput("userId is required".to_string()));
    }

    let user_id = profile.user_id.clone();
    match state.backend.create_profile(profile.clone()).await {
        Ok(()) => {
            if let Err(e) = state.cache.delete(&CacheKey::profile(&user_id)).await {
                tracing::warn!("Failed to invalidate cache: {}", e);
            }
            HttpResponse::Created().json(profile)
        }
        Err(e) => backend_error(e),
    }
}

/// Profile lookup, served from cache when possible
///
/// GET /api/v1/backend/profiles/{userId}
async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let user_id = path.into_inner();
    let cache_key = CacheKey::profile(&user_id);

    if let Ok(profile) = state.cache.get::<UserProfile>(&cache_key).await {
        return HttpResponse::Ok().json(profile);
    }

    match state.backend.get_profile(&user_id).await {
        Ok(profile) => {
            if let Err(e) = state.cache.set(&cache_key, &profile).await {
                tracing::warn!("Failed to cache profile {}: {}", user_id, e);
            }
            HttpResponse::Ok().json(profile)
        }
        Err(e) => backend_error(e),
    }
}

/// PATCH /api/v1/backend/profiles/{userId}
async fn update_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ProfileUpdate>,
) -> impl Responder {
    let user_id = path.into_inner();
    match state.backend.update_profile(&user_id, req.into_inner()).await {
        Ok(profile) => {
            if let Err(e) = state.cache.delete(&CacheKey::profile(&user_id)).await {
                tracing::warn!("Failed to invalidate cache: {}", e);
            }
            HttpResponse::Ok().json(profile)
        }
        Err(e) => backend_error(e),
    }
}

/// Backend discovery query using the viewer's stored preferences
///
/// GET /api/v1/backend/discovery?userId={userId}&limit={limit}
async fn discovery_users(
    state: web::Data<AppState>,
    query: web::Query<ViewerQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let preferences = state.store.read().await.preferences(&query.user_id).clone();
    let limit = query
        .limit
        .map(|l| l as usize)
        .unwrap_or(state.discovery_limit)
        .min(state.discovery_limit);

    match state.backend.discovery_users(&query.user_id, &preferences, limit).await {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => backend_error(e),
    }
}

/// Record a like; reports a match once the like is reciprocated
///
/// POST /api/v1/backend/likes
///
/// Request body:
/// ```json
/// {
///   "likerId": "string",
///   "likedId": "string"
/// }
/// ```
async fn record_like(
    state: web::Data<AppState>,
    req: web::Json<LikeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.backend.record_like(&req.liker_id, &req.liked_id).await {
        Ok(outcome) => {
            if outcome.is_match {
                for user_id in [&req.liker_id, &req.liked_id] {
                    if let Err(e) = state.cache.delete(&CacheKey::matches(user_id)).await {
                        tracing::warn!("Failed to invalidate cache: {}", e);
                    }
                }
            }
            HttpResponse::Ok().json(LikeResponse {
                success: true,
                is_match: outcome.is_match,
                match_id: outcome.new_match.map(|m| m.id),
            })
        }
        Err(e) => backend_error(e),
    }
}

/// GET /api/v1/backend/matches?userId={userId}
async fn user_matches(
    state: web::Data<AppState>,
    query: web::Query<ViewerQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let cache_key = CacheKey::matches(&query.user_id);
    if let Ok(matches) = state.cache.get::<Vec<Match>>(&cache_key).await {
        return HttpResponse::Ok().json(matches);
    }

    match state.backend.user_matches(&query.user_id).await {
        Ok(matches) => {
            if let Err(e) = state.cache.set(&cache_key, &matches).await {
                tracing::warn!("Failed to cache matches for {}: {}", query.user_id, e);
            }
            HttpResponse::Ok().json(matches)
        }
        Err(e) => backend_error(e),
    }
}

/// POST /api/v1/backend/messages
async fn send_message(
    state: web::Data<AppState>,
    req: web::Json<BackendMessageRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.backend.send_message(&req.match_id, &req.sender_id, &req.text).await {
        Ok(message) => {
            // last_message changed on the cached match lists
            if let Ok(matches) = state.backend.user_matches(&req.sender_id).await {
                if let Some(m) = matches.iter().find(|m| m.id == req.match_id) {
                    for user_id in [&m.participants.0, &m.participants.1] {
                        if let Err(e) = state.cache.delete(&CacheKey::matches(user_id)).await {
                            tracing::warn!("Failed to invalidate cache: {}", e);
                        }
                    }
                }
            }
            HttpResponse::Created().json(message)
        }
        Err(e) => backend_error(e),
    }
}

/// GET /api/v1/backend/messages?matchId={matchId}
async fn list_messages(
    state: web::Data<AppState>,
    query: web::Query<MatchQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    match state.backend.messages(&query.match_id).await {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => backend_error(e),
    }
}
