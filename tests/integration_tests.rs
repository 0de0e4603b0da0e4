// Integration tests for the Spark HTTP surface

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use spark_engine::core::DecisionResolver;
use spark_engine::models::{seed, Preferences};
use spark_engine::routes::{self, AppState};
use spark_engine::services::{AppStore, CacheManager, MemoryBackend, PersistenceBackend};
use std::sync::Arc;
use tokio::sync::RwLock;

async fn create_test_state(draw: f64) -> AppState {
    let backend = MemoryBackend::new();
    for profile in seed::demo_profiles() {
        backend.create_profile(profile).await.unwrap();
    }

    AppState {
        store: Arc::new(RwLock::new(AppStore::seeded(
            DecisionResolver::with_fixed_draw(draw),
            Preferences::default(),
        ))),
        backend: Arc::new(backend),
        cache: Arc::new(CacheManager::in_memory(100, 60)),
        discovery_limit: 20,
    }
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
                .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn candidate_ids(body: &Value) -> Vec<String> {
    body["candidates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["userId"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_health_reports_backend() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["cache"]["redisEnabled"], false);
    assert!(body["cache"]["l1Size"].is_u64());
}

#[actix_web::test]
async fn test_queue_excludes_viewer() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/queue?userId=user-1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let ids = candidate_ids(&body);
    assert_eq!(body["totalRemaining"], 5);
    assert!(!ids.contains(&"user-1".to_string()));
}

#[actix_web::test]
async fn test_queue_limit_keeps_total() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/queue?userId=user-1&limit=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(candidate_ids(&body).len(), 2);
    assert_eq!(body["totalRemaining"], 5);
}

#[actix_web::test]
async fn test_like_with_forced_match_notifies_viewer() {
    let app = test_app!(create_test_state(0.0).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/decide")
        .set_json(json!({"userId": "user-1", "candidateId": "user-4", "verdict": "like"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["type"], "decision");
    assert_eq!(body["matchCreated"], true);
    assert_eq!(body["remaining"], 4);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications?userId=user-1")
        .to_request();
    let notifications: Value = test::call_and_read_body_json(&app, req).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "match");

    let req = test::TestRequest::get()
        .uri("/api/v1/matches?userId=user-4")
        .to_request();
    let matches: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(matches["count"], 1);
}

#[actix_web::test]
async fn test_pass_removes_candidate_without_match() {
    let app = test_app!(create_test_state(0.0).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/decide")
        .set_json(json!({"userId": "user-1", "candidateId": "user-6", "verdict": "pass"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["matchCreated"], false);

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/queue?userId=user-1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(!candidate_ids(&body).contains(&"user-6".to_string()));

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications?userId=user-1")
        .to_request();
    let notifications: Value = test::call_and_read_body_json(&app, req).await;
    assert!(notifications.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_deciding_twice_conflicts() {
    let app = test_app!(create_test_state(0.9).await);
    let payload = json!({"userId": "user-1", "candidateId": "user-2", "verdict": "pass"});

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/decide")
        .set_json(payload.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/decide")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_unknown_candidate_not_found() {
    let app = test_app!(create_test_state(0.0).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/decide")
        .set_json(json!({"userId": "user-1", "candidateId": "nobody", "verdict": "like"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 404);
}

#[actix_web::test]
async fn test_invalid_verdict_rejected() {
    let app = test_app!(create_test_state(0.0).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/decide")
        .set_json(json!({"userId": "user-1", "candidateId": "user-2", "verdict": "maybe"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_reset_restores_queue() {
    let app = test_app!(create_test_state(0.9).await);

    for candidate in ["user-2", "user-3"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/discovery/decide")
            .set_json(json!({"userId": "user-1", "candidateId": candidate, "verdict": "pass"}))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/discovery/reset")
        .set_json(json!({"userId": "user-1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["type"], "reset");
    assert_eq!(body["remaining"], 5);

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/next?userId=user-1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["exhausted"], false);
    assert_eq!(body["candidate"]["userId"], "user-2");
}

#[actix_web::test]
async fn test_preferences_update_narrows_queue() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::put()
        .uri("/api/v1/preferences")
        .set_json(json!({"userId": "user-1", "interestedIn": "Female"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/queue?userId=user-1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    for candidate in body["candidates"].as_array().unwrap() {
        assert_eq!(candidate["gender"], "Female");
    }
}

#[actix_web::test]
async fn test_inverted_age_range_rejected() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::put()
        .uri("/api/v1/preferences")
        .set_json(json!({"userId": "user-1", "ageRange": [40, 20]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_chat_flow_marks_read() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/match-1/messages")
        .set_json(json!({"senderId": "user-1", "text": "See you Saturday?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/v1/matches/match-1/messages")
        .to_request();
    let messages: Value = test::call_and_read_body_json(&app, req).await;
    let last = messages.as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["text"], "See you Saturday?");

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/match-1/read?userId=user-1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["type"], "markedRead");
}

#[actix_web::test]
async fn test_notification_add_and_dismiss() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/notifications")
        .set_json(json!({"recipientId": "user-1", "kind": "success", "message": "Profile saved"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let id = body["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/notifications/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/notifications/{}", id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_profile_update_and_lookup() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::patch()
        .uri("/api/v1/profiles/user-2")
        .set_json(json!({"bio": "Trail runner"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles/user-2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["bio"], "Trail runner");

    let req = test::TestRequest::get()
        .uri("/api/v1/profiles/nobody")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_backend_reciprocal_like_creates_match() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/backend/likes")
        .set_json(json!({"likerId": "user-2", "likedId": "user-4"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isMatch"], false);

    let req = test::TestRequest::post()
        .uri("/api/v1/backend/likes")
        .set_json(json!({"likerId": "user-4", "likedId": "user-2"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isMatch"], true);
    assert_eq!(body["matchId"], "user-4_user-2");

    let req = test::TestRequest::get()
        .uri("/api/v1/backend/matches?userId=user-2")
        .to_request();
    let matches: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(matches.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_backend_profile_roundtrip() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::get()
        .uri("/api/v1/backend/profiles/user-3")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["userId"], "user-3");

    let req = test::TestRequest::patch()
        .uri("/api/v1/backend/profiles/user-3")
        .set_json(json!({"location": "Denver, CO"}))
        .to_request();
    test::call_service(&app, req).await;

    // Cached copy is invalidated by the update
    let req = test::TestRequest::get()
        .uri("/api/v1/backend/profiles/user-3")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["location"], "Denver, CO");
}

#[actix_web::test]
async fn test_zero_limit_rejected() {
    let app = test_app!(create_test_state(0.9).await);

    for uri in [
        "/api/v1/backend/discovery?userId=user-1&limit=0",
        "/api/v1/discovery/queue?userId=user-1&limit=0",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

#[actix_web::test]
async fn test_backend_discovery_respects_limit() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::get()
        .uri("/api/v1/backend/discovery?userId=user-1&limit=2")
        .to_request();
    let users: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn test_missing_user_id_is_bad_request() {
    let app = test_app!(create_test_state(0.9).await);

    let req = test::TestRequest::get()
        .uri("/api/v1/discovery/queue")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
