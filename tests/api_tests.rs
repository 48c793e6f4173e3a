// HTTP tests for the Lume Swipe API

use actix_web::{http::StatusCode, test, web, App};
use lume_swipe::core::SwipeService;
use lume_swipe::models::{
    DiscoverResponse, ErrorResponse, Location, LoginResponse, MatchesResponse, Profile, ProfileId,
    SwipeResponse,
};
use lume_swipe::routes::{self, AppState, SESSION_HEADER};
use lume_swipe::services::password::hash_password;
use lume_swipe::services::{InMemoryStore, ProfileStore};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PASSWORD: &str = "papayas123";

fn seeded_profile(id: ProfileId, age: i32, gender: &str, location: Location, password_hash: &str) -> Profile {
    Profile {
        id,
        age,
        name: format!("User {}", id),
        gender: gender.to_string(),
        email: format!("user{}@lume.test", id),
        password_hash: password_hash.to_string(),
        location,
        created_at: chrono::Utc::now(),
    }
}

/// Store with four profiles around London sharing one password
async fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::default());
    let hash = hash_password(PASSWORD).unwrap();

    let profiles = [
        (1, 30, "male", Location { lat: 51.5081, long: -0.0877 }),
        (2, 28, "female", Location { lat: 51.5578, long: -0.1141 }),
        (3, 35, "female", Location { lat: 51.5090, long: -0.0880 }),
        (4, 60, "other", Location { lat: 48.8566, long: 2.3522 }),
    ];
    for (id, age, gender, location) in profiles {
        store.seed_profile(seeded_profile(id, age, gender, location, &hash)).await;
    }

    store
}

fn app_state(store: &Arc<InMemoryStore>) -> AppState {
    let swipes = SwipeService::new(store.clone(), Duration::from_secs(5));
    AppState::new(store.clone(), swipes)
}

macro_rules! init_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(app_state(&$store)))
                .configure(routes::configure_routes),
        )
        .await
    };
}

async fn login(store: &Arc<InMemoryStore>, id: ProfileId) -> String {
    store
        .login(&format!("user{}@lume.test", id), PASSWORD)
        .await
        .unwrap()
}

#[actix_web::test]
async fn test_create_user_returns_profile_without_password() {
    let store = Arc::new(InMemoryStore::default());
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/v1/user/create")
        .set_json(json!({
            "email": "john@lume.test",
            "password": PASSWORD,
            "name": "John",
            "age": 31,
            "gender": "male",
            "lat": 51.5,
            "long": -0.1
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["id"].as_i64().unwrap() >= 1);
    assert_eq!(body["email"], "john@lume.test");
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn test_create_user_rejects_unknown_gender() {
    let store = Arc::new(InMemoryStore::default());
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/v1/user/create")
        .set_json(json!({
            "email": "john@lume.test",
            "password": PASSWORD,
            "name": "John",
            "age": 31,
            "gender": "robot",
            "lat": 51.5,
            "long": -0.1
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_login_with_wrong_password_fails() {
    let store = seeded_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": "user1@lume.test", "password": "dolphins123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "login_failed");
}

/// Log sink shared between the subscriber and the test
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[actix_web::test]
async fn test_failed_login_log_omits_email() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = seeded_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": "user2@lume.test", "password": "dolphins123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let output = logs.contents();
    assert!(output.contains("Login failed"), "missing log line: {}", output);
    assert!(!output.contains("user2@lume.test"), "email leaked into logs: {}", output);
}

#[actix_web::test]
async fn test_login_returns_usable_token() {
    let store = seeded_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": "user1@lume.test", "password": PASSWORD }))
        .to_request();
    let body: LoginResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!body.token.is_empty());

    let req = test::TestRequest::get()
        .uri("/api/v1/matches")
        .insert_header((SESSION_HEADER, body.token))
        .to_request();
    let matches: MatchesResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(matches.user_id, 1);
    assert_eq!(matches.count, 0);
}

#[actix_web::test]
async fn test_swipe_requires_session() {
    let store = seeded_store().await;
    let app = init_app!(store);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .set_json(json!({ "user": 2, "liked": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header((SESSION_HEADER, "not-a-session"))
        .set_json(json!({ "user": 2, "liked": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_swipe_returns_match_id_only_on_match() {
    let store = seeded_store().await;
    let app = init_app!(store);
    let token_1 = login(&store, 1).await;
    let token_3 = login(&store, 3).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header((SESSION_HEADER, token_3))
        .set_json(json!({ "user": 1, "liked": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let raw: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(raw["matched"], false);
    assert!(raw.get("matchId").is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header((SESSION_HEADER, token_1.clone()))
        .set_json(json!({ "user": 3, "liked": true }))
        .to_request();
    let body: SwipeResponse = test::call_and_read_body_json(&app, req).await;
    assert!(body.matched);
    assert!(body.match_id.unwrap_or(0) > 0);

    let req = test::TestRequest::get()
        .uri("/api/v1/matches")
        .insert_header((SESSION_HEADER, token_1))
        .to_request();
    let matches: MatchesResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(matches.count, 1);
    assert_eq!(Some(matches.matches[0].id), body.match_id);
}

#[actix_web::test]
async fn test_swipe_on_unknown_profile_is_bad_request() {
    let store = seeded_store().await;
    let app = init_app!(store);
    let token = login(&store, 1).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header((SESSION_HEADER, token))
        .set_json(json!({ "user": 404, "liked": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.message, "failed to swipe on profile");
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let store = seeded_store().await;
    let app = init_app!(store);
    let token = login(&store, 1).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header((SESSION_HEADER, token))
        .insert_header(("content-type", "application/json"))
        .set_payload(r#"{"user": "two"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "invalid_request");
}

#[actix_web::test]
async fn test_discover_sorts_by_distance_and_skips_swiped() {
    let store = seeded_store().await;
    let app = init_app!(store);
    let token = login(&store, 1).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/discover")
        .insert_header((SESSION_HEADER, token.clone()))
        .set_json(json!({ "lat": 51.5081, "long": -0.0877 }))
        .to_request();
    let body: DiscoverResponse = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<ProfileId> = body.results.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 2, 4]);

    let req = test::TestRequest::post()
        .uri("/api/v1/swipe")
        .insert_header((SESSION_HEADER, token.clone()))
        .set_json(json!({ "user": 3, "liked": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/discover")
        .insert_header((SESSION_HEADER, token))
        .set_json(json!({ "minAge": 18, "maxAge": 40, "genders": ["female"], "lat": 51.5081, "long": -0.0877 }))
        .to_request();
    let body: DiscoverResponse = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<ProfileId> = body.results.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2]);
}

#[actix_web::test]
async fn test_discover_rejects_out_of_bounds_age() {
    let store = seeded_store().await;
    let app = init_app!(store);
    let token = login(&store, 1).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/discover")
        .insert_header((SESSION_HEADER, token))
        .set_json(json!({ "maxAge": 2000, "lat": -0.111, "long": 0.123 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "validation_error");
}

#[actix_web::test]
async fn test_health_check() {
    let store = Arc::new(InMemoryStore::default());
    let app = init_app!(store);

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "healthy");
}
