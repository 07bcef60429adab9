//! Room view model
//!
//! Reads the session bundle left by the launch flow and decides whether the
//! video transport may be shown. A bundle without a token, room or server URL
//! is a session error; the transport is never started for it.
//!
//! Leaving the room or losing the transport deletes the bundle.

use std::sync::Arc;

use serde_json::Value;

use crate::chat::ChatLog;
use crate::launch::SessionBundle;
use crate::storage::{keys, Storage};
use crate::whiteboard::Whiteboard;

pub const NO_SESSION_ERROR: &str = "No session data found. Please start a new session.";
pub const INVALID_SESSION_ERROR: &str = "Invalid session data. Please start a new session.";

const WHITEBOARD_SIZE: (u16, u16) = (48, 12);

#[derive(Debug, Clone, PartialEq)]
pub enum RoomPhase {
    /// Bundle validated, transport may connect
    Ready(SessionBundle),
    /// Session Error screen with the reason
    Error(String),
    /// Bundle deleted after leave or disconnect
    Closed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransportState {
    #[default]
    Connecting,
    Connected,
    Disconnected {
        reason: Option<String>,
    },
}

/// Local camera / microphone / screen-share switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaControls {
    pub camera: bool,
    pub microphone: bool,
    pub screen_share: bool,
}

impl Default for MediaControls {
    fn default() -> Self {
        Self {
            camera: true,
            microphone: true,
            screen_share: false,
        }
    }
}

impl MediaControls {
    pub fn toggle_camera(&mut self) -> bool {
        self.camera = !self.camera;
        self.camera
    }

    pub fn toggle_microphone(&mut self) -> bool {
        self.microphone = !self.microphone;
        self.microphone
    }

    pub fn toggle_screen_share(&mut self) -> bool {
        self.screen_share = !self.screen_share;
        self.screen_share
    }
}

pub struct RoomView {
    storage: Arc<Storage>,
    phase: RoomPhase,
    transport: TransportState,
    pub chat: ChatLog,
    pub media: MediaControls,
    pub whiteboard: Whiteboard,
}

impl RoomView {
    /// Load and validate the stored session bundle
    pub fn open(storage: Arc<Storage>) -> Self {
        let phase = match storage.get(keys::CURRENT_SESSION) {
            None => {
                tracing::error!("No session data in storage");
                RoomPhase::Error(NO_SESSION_ERROR.to_string())
            }
            Some(value) => match validate_bundle(value) {
                Some(bundle) => {
                    tracing::info!("Session loaded for room {}", bundle.room.room_name);
                    RoomPhase::Ready(bundle)
                }
                None => {
                    tracing::error!("Invalid session data structure");
                    RoomPhase::Error(INVALID_SESSION_ERROR.to_string())
                }
            },
        };

        Self {
            storage,
            phase,
            transport: TransportState::Connecting,
            chat: ChatLog::new(),
            media: MediaControls::default(),
            whiteboard: Whiteboard::new(WHITEBOARD_SIZE.0, WHITEBOARD_SIZE.1),
        }
    }

    pub fn phase(&self) -> &RoomPhase {
        &self.phase
    }

    pub fn bundle(&self) -> Option<&SessionBundle> {
        match &self.phase {
            RoomPhase::Ready(bundle) => Some(bundle),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            RoomPhase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    /// Only a ready session may start the video transport
    pub fn can_connect(&self) -> bool {
        matches!(self.phase, RoomPhase::Ready(_))
    }

    pub fn on_connected(&mut self) {
        if self.can_connect() {
            tracing::info!("Connected to video room");
            self.transport = TransportState::Connected;
        }
    }

    /// Transport dropped: the session is over
    pub fn on_disconnected(&mut self, reason: Option<&str>) {
        tracing::info!("Disconnected from video room ({})", reason.unwrap_or("no reason"));
        self.transport = TransportState::Disconnected {
            reason: reason.map(String::from),
        };
        self.close();
    }

    pub fn leave(&mut self) {
        tracing::info!("Leaving session");
        self.transport = TransportState::Disconnected { reason: None };
        self.close();
    }

    /// From the error screen: discard whatever bundle is stored
    pub fn start_new_session(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.storage.remove(keys::CURRENT_SESSION);
        self.phase = RoomPhase::Closed;
    }
}

/// Typed bundle if token, room and serverUrl are all present
fn validate_bundle(value: Value) -> Option<SessionBundle> {
    let non_empty_str = |field: &str| value.get(field).and_then(Value::as_str).is_some_and(|s| !s.is_empty());
    let has_room = value.get("room").is_some_and(Value::is_object);

    if !(non_empty_str("token") && non_empty_str("serverUrl") && has_room) {
        return None;
    }

    serde_json::from_value(value)
        .inspect_err(|e| tracing::warn!("Session bundle has unexpected shape: {}", e))
        .ok()
}
