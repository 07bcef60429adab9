mod common;

use std::sync::Arc;

use learnops_core::catalog::find_offer;
use learnops_core::config::ApiConfig;
use learnops_core::room::{RoomPhase, INVALID_SESSION_ERROR};
use learnops_core::storage::keys;
use learnops_core::{ApiClient, ApiError, AuthSession, LaunchStage, Launcher, RoomService, RoomView, Storage};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{api_client, auth_body, profile_body, TRANSPORT_URL};

async fn mount_sign_in(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(token)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sign_in_stores_token_and_user() {
    let server = MockServer::start().await;
    mount_sign_in(&server, "tok-1").await;

    let api = api_client(&server);
    let session = AuthSession::new(Arc::clone(&api));

    let user = session.sign_in("ada@example.com", "password123").await.unwrap();

    assert_eq!(user.name, "Ada Lovelace");
    assert!(session.is_authenticated().await);
    assert!(!session.is_loading());
    assert_eq!(api.storage().get_raw(keys::ACCESS_TOKEN).as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn test_sign_in_without_token_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user": { "id": "u" } })))
        .mount(&server)
        .await;

    let api = api_client(&server);
    let session = AuthSession::new(Arc::clone(&api));

    let err = session.sign_in("ada@example.com", "password123").await.unwrap_err();
    assert_eq!(err.to_string(), "No access token received");
    assert!(!session.is_authenticated().await);
    assert!(!api.storage().contains(keys::ACCESS_TOKEN));
}

#[tokio::test]
async fn test_sign_in_error_is_rethrown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid login credentials" })))
        .mount(&server)
        .await;

    let session = AuthSession::new(api_client(&server));
    let err = session.sign_in("ada@example.com", "wrongpass").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(session.current_user().await.is_none());
}

#[tokio::test]
async fn test_sign_up_name_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_partial_json(json!({ "name": "Grace Hopper" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "id": "u2", "email": "grace@example.com" },
            "session": { "access_token": "tok-2" }
        })))
        .mount(&server)
        .await;

    let session = AuthSession::new(api_client(&server));
    let user = session
        .sign_up("grace@example.com", "password123", "Grace Hopper")
        .await
        .unwrap();

    assert_eq!(user.name, "Grace Hopper");
    assert_eq!(user.email, "grace@example.com");
}

#[tokio::test]
async fn test_offline_sign_out_clears_local_state() {
    let server = MockServer::start().await;
    mount_sign_in(&server, "tok-1").await;

    let api = api_client(&server);
    let session = AuthSession::new(Arc::clone(&api));
    session.sign_in("ada@example.com", "password123").await.unwrap();

    // Backend goes away before sign-out
    drop(server);

    session.sign_out().await;
    assert!(!session.is_authenticated().await);
    assert!(!api.storage().contains(keys::ACCESS_TOKEN));
}

#[tokio::test]
async fn test_initialize_restores_user_from_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", "Bearer saved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    let api = api_client(&server);
    api.storage().set(keys::ACCESS_TOKEN, "saved");
    let session = AuthSession::new(Arc::clone(&api));

    session.initialize().await;

    let user = session.current_user().await.unwrap();
    assert_eq!(user.id, "user-1");
    assert_eq!(user.name, "Ada Lovelace");
}

#[tokio::test]
async fn test_initialize_with_rejected_token_signs_out_silently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = api_client(&server);
    api.storage().set(keys::ACCESS_TOKEN, "revoked");
    let session = AuthSession::new(Arc::clone(&api));

    session.initialize().await;

    assert!(!session.is_authenticated().await);
    assert!(!api.storage().contains(keys::ACCESS_TOKEN));
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_initialize_without_token_makes_no_request() {
    let server = MockServer::start().await;
    let session = AuthSession::new(api_client(&server));

    session.initialize().await;

    assert!(!session.is_authenticated().await);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_launch_requires_authentication() {
    let server = MockServer::start().await;
    let api = api_client(&server);
    let session = AuthSession::new(Arc::clone(&api));
    let rooms = Arc::new(RoomService::new(Arc::clone(&api), TRANSPORT_URL));
    let launcher = Launcher::new(session, rooms, Arc::clone(api.storage()));

    let offer = find_offer("math-calculus").unwrap();
    let err = launcher.launch(&offer, |_| {}).await.unwrap_err();

    assert!(matches!(err, ApiError::AuthRequired));
    assert!(!api.storage().contains(keys::CURRENT_SESSION));
}

#[tokio::test]
async fn test_launch_stores_bundle_for_room_view() {
    let server = MockServer::start().await;
    mount_sign_in(&server, "tok-1").await;
    Mock::given(method("POST"))
        .and(path("/livekit/create-room"))
        .and(body_partial_json(json!({
            "maxParticipants": 2,
            "subject": "Advanced Calculus",
            "tutorType": "Dr. MathBot Pro"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "room": {
                "roomName": "tutor-abc",
                "roomId": "RM_1",
                "serverUrl": "wss://somewhere-else",
                "maxParticipants": 2,
                "subject": "Advanced Calculus",
                "tutorType": "Dr. MathBot Pro"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/livekit/generate-token"))
        .and(body_partial_json(json!({ "roomName": "tutor-abc", "role": "student" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "participant-jwt",
            "participant": { "name": "Ada Lovelace", "role": "student", "userId": "user-1" },
            "room": { "name": "tutor-abc", "serverUrl": "wss://somewhere-else" }
        })))
        .mount(&server)
        .await;

    let api = api_client(&server);
    let session = AuthSession::new(Arc::clone(&api));
    session.sign_in("ada@example.com", "password123").await.unwrap();

    let rooms = Arc::new(RoomService::new(Arc::clone(&api), TRANSPORT_URL));
    let launcher = Launcher::new(session, rooms, Arc::clone(api.storage()));

    let offer = find_offer("math-calculus").unwrap();
    let mut stages = Vec::new();
    let bundle = launcher.launch(&offer, |stage| stages.push(stage.clone())).await.unwrap();

    assert_eq!(bundle.token, "participant-jwt");
    assert_eq!(bundle.server_url, TRANSPORT_URL);
    assert_eq!(bundle.room.server_url, TRANSPORT_URL);
    assert_eq!(stages.first(), Some(&LaunchStage::Initializing));
    assert_eq!(
        stages.last(),
        Some(&LaunchStage::Ready {
            room_name: "tutor-abc".to_string()
        })
    );

    let view = RoomView::open(Arc::clone(api.storage()));
    assert_eq!(view.phase(), &RoomPhase::Ready(bundle));
}

#[tokio::test]
async fn test_launch_aborts_on_token_failure() {
    let server = MockServer::start().await;
    mount_sign_in(&server, "tok-1").await;
    Mock::given(method("POST"))
        .and(path("/livekit/create-room"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "room": { "roomName": "tutor-abc" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/livekit/generate-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Room is full"
        })))
        .mount(&server)
        .await;

    let api = api_client(&server);
    let session = AuthSession::new(Arc::clone(&api));
    session.sign_in("ada@example.com", "password123").await.unwrap();

    let rooms = Arc::new(RoomService::new(Arc::clone(&api), TRANSPORT_URL));
    let launcher = Launcher::new(session, rooms, Arc::clone(api.storage()));

    let offer = find_offer("music-theory").unwrap();
    let err = launcher.launch(&offer, |_| {}).await.unwrap_err();

    assert_eq!(err.to_string(), "Room is full");
    assert!(!api.storage().contains(keys::CURRENT_SESSION));
}

#[test]
fn test_room_view_rejects_bundle_without_token() {
    let storage = Arc::new(Storage::in_memory());
    storage.set(
        keys::CURRENT_SESSION,
        &json!({
            "room": { "roomName": "tutor-abc" },
            "serverUrl": TRANSPORT_URL
        }),
    );

    let view = RoomView::open(storage);
    assert_eq!(view.error(), Some(INVALID_SESSION_ERROR));
    assert!(!view.can_connect());
}

#[tokio::test]
async fn test_file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let server = MockServer::start().await;
    mount_sign_in(&server, "persisted").await;

    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    let api = Arc::new(ApiClient::new(&config, Arc::new(Storage::open(&path))));
    let session = AuthSession::new(Arc::clone(&api));
    session.sign_in("ada@example.com", "password123").await.unwrap();

    let reopened = Storage::open(&path);
    assert_eq!(reopened.get_raw(keys::ACCESS_TOKEN).as_deref(), Some("persisted"));
}
