mod common;

use learnops_core::models::{CreateRoom, ProfileUpdate};
use learnops_core::{ProfileService, RoomService};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{api_client, profile_body, TRANSPORT_URL};

async fn mount(server: &MockServer, verb: &str, route: &str, body: serde_json::Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn rooms(server: &MockServer) -> RoomService {
    RoomService::new(api_client(server), TRANSPORT_URL)
}

fn tutoring_room() -> CreateRoom {
    CreateRoom {
        subject: Some("Organic Chemistry".to_string()),
        tutor_type: Some("Prof. ChemBot".to_string()),
        max_participants: Some(2),
        room_name: None,
    }
}

#[tokio::test]
async fn test_create_room_reports_backend_error_when_room_missing() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/livekit/create-room",
        json!({ "success": true, "error": "LiveKit quota exceeded" }),
    )
    .await;

    let err = rooms(&server).create_room(&tutoring_room()).await.unwrap_err();
    assert_eq!(err.to_string(), "LiveKit quota exceeded");
}

#[tokio::test]
async fn test_create_room_falls_back_to_generic_message() {
    let server = MockServer::start().await;
    mount(&server, "POST", "/livekit/create-room", json!({ "success": true })).await;

    let err = rooms(&server).create_room(&tutoring_room()).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to create room - invalid response");
}

#[tokio::test]
async fn test_create_room_uses_configured_transport() {
    let server = MockServer::start().await;
    mount(
        &server,
        "POST",
        "/livekit/create-room",
        json!({
            "success": true,
            "room": { "roomName": "chem-1", "serverUrl": "wss://elsewhere", "maxParticipants": 2 }
        }),
    )
    .await;

    let room = rooms(&server).create_room(&tutoring_room()).await.unwrap();
    assert_eq!(room.room_name, "chem-1");
    assert_eq!(room.server_url, TRANSPORT_URL);
}

#[tokio::test]
async fn test_active_rooms_null_is_empty() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/livekit/active-rooms", json!({ "success": true, "rooms": null })).await;

    let listed = rooms(&server).active_rooms().await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_active_rooms_lists_entries() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/livekit/active-rooms",
        json!({
            "success": true,
            "rooms": [
                { "roomName": "chem-1", "numParticipants": 1, "maxParticipants": 2, "subject": "Organic Chemistry" },
                { "roomName": "calc-7", "numParticipants": 2, "maxParticipants": 2 }
            ]
        }),
    )
    .await;

    let listed = rooms(&server).active_rooms().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].room_name, "chem-1");
    assert_eq!(listed[0].num_participants, 1);
    assert_eq!(listed[1].subject, "");
}

#[tokio::test]
async fn test_delete_room_acknowledged() {
    let server = MockServer::start().await;
    mount(
        &server,
        "DELETE",
        "/livekit/room/chem-1",
        json!({ "success": true, "message": "Room deleted" }),
    )
    .await;

    let ack = rooms(&server).delete_room("chem-1").await.unwrap();
    assert_eq!(ack.get("message"), Some(&json!("Room deleted")));
}

#[tokio::test]
async fn test_delete_room_failure_carries_backend_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "DELETE",
        "/livekit/room/chem-1",
        json!({ "success": false, "error": "Room does not exist" }),
    )
    .await;

    let err = rooms(&server).delete_room("chem-1").await.unwrap_err();
    assert_eq!(err.to_string(), "Room does not exist");
}

#[tokio::test]
async fn test_delete_room_failure_without_message() {
    let server = MockServer::start().await;
    mount(&server, "DELETE", "/livekit/room/chem-1", json!({ "success": false })).await;

    let err = rooms(&server).delete_room("chem-1").await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to delete room");
}

#[tokio::test]
async fn test_room_info_stamps_transport_url() {
    let server = MockServer::start().await;
    mount(
        &server,
        "GET",
        "/livekit/room/chem-1/info",
        json!({
            "success": true,
            "room": { "roomName": "chem-1", "numParticipants": 1, "serverUrl": "wss://elsewhere" }
        }),
    )
    .await;

    let info = rooms(&server).room_info("chem-1").await.unwrap();
    assert_eq!(info.get("roomName"), Some(&json!("chem-1")));
    assert_eq!(info.get("serverUrl"), Some(&json!(TRANSPORT_URL)));
}

#[tokio::test]
async fn test_room_info_missing_room() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/livekit/room/ghost/info", json!({ "success": true })).await;

    let err = rooms(&server).room_info("ghost").await.unwrap_err();
    assert_eq!(err.to_string(), "Room not found");
}

#[tokio::test]
async fn test_get_profile() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/profile", profile_body()).await;

    let profile = ProfileService::new(api_client(&server)).get_profile().await.unwrap();
    assert_eq!(profile.id, "user-1");
    assert_eq!(profile.display_name(), "Ada Lovelace");
}

#[tokio::test]
async fn test_get_profile_absent_is_error() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/profile", json!({})).await;

    let err = ProfileService::new(api_client(&server)).get_profile().await.unwrap_err();
    assert_eq!(err.to_string(), "Profile not found");
}

#[tokio::test]
async fn test_update_profile_sends_name() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/profile"))
        .and(body_partial_json(json!({ "full_name": "Ada Lovelace" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let update = ProfileUpdate {
        full_name: Some("Ada Lovelace".to_string()),
    };
    let profile = ProfileService::new(api_client(&server)).update_profile(&update).await.unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));
}

#[tokio::test]
async fn test_update_profile_absent_is_error() {
    let server = MockServer::start().await;
    mount(&server, "PUT", "/profile", json!({ "profile": null })).await;

    let update = ProfileUpdate {
        full_name: Some("Ada Lovelace".to_string()),
    };
    let err = ProfileService::new(api_client(&server))
        .update_profile(&update)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to update profile");
}
