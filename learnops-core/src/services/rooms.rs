//! Room and token issuance for the real-time video transport
//!
//! Every endpoint answers with a `{success: bool, ...}` envelope. The
//! envelope is validated once, at this boundary, into a [`Reply`]; a failed
//! reply becomes an error carrying the backend's `error` field.
//!
//! The transport URL on room and token responses always comes from local
//! configuration, never from the backend payload.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::{endpoints, ApiClient, ApiError};
use crate::models::{ActiveRoom, CreateRoom, Room, TokenGrant, TokenRequest};

/// Validated `{success, ...}` envelope
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `success: true`; the remaining fields of the body, plus any `error` it carried
    Success {
        fields: Map<String, Value>,
        error: Option<String>,
    },
    /// `success` false or missing; the backend's error message, if any
    Failure(Option<String>),
}

impl Reply {
    pub fn parse(body: Value) -> Self {
        let Value::Object(mut fields) = body else {
            return Reply::Failure(None);
        };

        let success = fields.remove("success").and_then(|v| v.as_bool()).unwrap_or(false);
        let error = match fields.remove("error") {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        };

        if success {
            Reply::Success { fields, error }
        } else {
            Reply::Failure(error)
        }
    }

    /// Require `field` to be present and non-null, else fail with the
    /// backend's `error`, or `fallback` when there is none
    fn require(self, field: &str, fallback: &str) -> Result<Map<String, Value>, ApiError> {
        match self {
            Reply::Success { fields, .. } if fields.get(field).is_some_and(|v| !v.is_null()) => Ok(fields),
            Reply::Success { error, .. } | Reply::Failure(error) => {
                Err(ApiError::Backend(error.unwrap_or_else(|| fallback.to_string())))
            }
        }
    }

    fn accept(self, fallback: &str) -> Result<Map<String, Value>, ApiError> {
        match self {
            Reply::Success { fields, .. } => Ok(fields),
            Reply::Failure(message) => Err(ApiError::Backend(message.unwrap_or_else(|| fallback.to_string()))),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomBody<'a> {
    #[serde(flatten)]
    room: &'a CreateRoom,
    server_url: &'a str,
}

pub struct RoomService {
    api: Arc<ApiClient>,
    server_url: String,
}

impl RoomService {
    /// `server_url` is the configured video transport endpoint
    pub fn new(api: Arc<ApiClient>, server_url: impl Into<String>) -> Self {
        Self {
            api,
            server_url: server_url.into(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub async fn create_room(&self, data: &CreateRoom) -> Result<Room, ApiError> {
        tracing::info!("Creating room for {:?}", data.subject);

        let body: Value = self
            .api
            .post(
                endpoints::LIVEKIT_CREATE_ROOM,
                &CreateRoomBody {
                    room: data,
                    server_url: &self.server_url,
                },
            )
            .await?;

        let mut fields = Reply::parse(body).require("room", "Failed to create room - invalid response")?;
        let mut room: Room = take(&mut fields, "room")?;
        room.server_url = self.server_url.clone();

        tracing::info!("Room created: {}", room.room_name);
        Ok(room)
    }

    pub async fn generate_token(&self, request: &TokenRequest) -> Result<TokenGrant, ApiError> {
        tracing::info!("Generating access token for room {}", request.room_name);

        let body: Value = self.api.post(endpoints::LIVEKIT_GENERATE_TOKEN, request).await?;
        let fields = Reply::parse(body).require("token", "Failed to generate token - invalid response")?;

        let mut grant: TokenGrant = serde_json::from_value(Value::Object(fields))?;
        grant.room.server_url = self.server_url.clone();
        Ok(grant)
    }

    pub async fn active_rooms(&self) -> Result<Vec<ActiveRoom>, ApiError> {
        let body: Value = self.api.get(endpoints::LIVEKIT_ACTIVE_ROOMS).await?;
        let mut fields = Reply::parse(body).accept("Failed to fetch active rooms")?;

        let rooms: Vec<ActiveRoom> = match fields.remove("rooms") {
            Some(Value::Null) | None => Vec::new(),
            Some(rooms) => serde_json::from_value(rooms)?,
        };
        tracing::debug!("Fetched {} active rooms", rooms.len());
        Ok(rooms)
    }

    /// Tear down a room; returns the backend's acknowledgement
    pub async fn delete_room(&self, room_id: &str) -> Result<Map<String, Value>, ApiError> {
        tracing::info!("Deleting room {}", room_id);
        let body: Value = self.api.delete(&endpoints::delete_room(room_id)).await?;
        Reply::parse(body).accept("Failed to delete room")
    }

    /// Room descriptor with the configured transport URL stamped on
    pub async fn room_info(&self, room_name: &str) -> Result<Map<String, Value>, ApiError> {
        let body: Value = self.api.get(&endpoints::room_info(room_name)).await?;
        let mut fields = Reply::parse(body).require("room", "Room not found")?;

        let mut room: Map<String, Value> = take(&mut fields, "room")?;
        room.insert("serverUrl".to_string(), Value::String(self.server_url.clone()));
        Ok(room)
    }

    /// Transport liveness, unauthenticated
    pub async fn check_health(&self) -> Result<Value, ApiError> {
        self.api.probe(endpoints::LIVEKIT_HEALTH).await
    }
}

fn take<T: DeserializeOwned>(fields: &mut Map<String, Value>, field: &str) -> Result<T, ApiError> {
    let value = fields.remove(field).unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}
