//! Session launch: catalog entry -> room -> student token -> stored bundle
//!
//! The sequence is linear. Any failing step aborts with that step's error and
//! nothing is rolled back; a room created without a token is simply left for
//! the backend to expire.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::catalog::SessionOffer;
use crate::models::{CreateRoom, Participant, ParticipantRole, Room, TokenRequest};
use crate::services::RoomService;
use crate::session::AuthSession;
use crate::storage::{keys, Storage};

/// Participants per tutoring room: the student and the tutor
pub const ROOM_CAPACITY: u32 = 2;

/// Everything the room view needs to join a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBundle {
    pub room: Room,
    pub token: String,
    pub participant: Participant,
    pub session: SessionOffer,
    pub server_url: String,
}

/// Progress reported while a launch runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStage {
    Initializing,
    CreatingRoom,
    GeneratingToken,
    Preparing,
    Ready { room_name: String },
}

impl fmt::Display for LaunchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchStage::Initializing => write!(f, "Initializing session..."),
            LaunchStage::CreatingRoom => write!(f, "Creating room..."),
            LaunchStage::GeneratingToken => write!(f, "Generating access token..."),
            LaunchStage::Preparing => write!(f, "Preparing session..."),
            LaunchStage::Ready { room_name } => write!(f, "Redirecting to session {}...", room_name),
        }
    }
}

pub struct Launcher {
    session: Arc<AuthSession>,
    rooms: Arc<RoomService>,
    storage: Arc<Storage>,
}

impl Launcher {
    pub fn new(session: Arc<AuthSession>, rooms: Arc<RoomService>, storage: Arc<Storage>) -> Self {
        Self {
            session,
            rooms,
            storage,
        }
    }

    /// Provision a room for `offer` and store the bundle for the room view
    pub async fn launch(
        &self,
        offer: &SessionOffer,
        mut on_stage: impl FnMut(&LaunchStage),
    ) -> Result<SessionBundle, ApiError> {
        if !self.session.is_authenticated().await {
            return Err(ApiError::AuthRequired);
        }

        on_stage(&LaunchStage::Initializing);
        tracing::info!("Starting session for {}", offer.subject);

        on_stage(&LaunchStage::CreatingRoom);
        let room = self
            .rooms
            .create_room(&CreateRoom {
                room_name: None,
                max_participants: Some(ROOM_CAPACITY),
                subject: Some(offer.subject.clone()),
                tutor_type: Some(offer.tutor.clone()),
            })
            .await?;

        on_stage(&LaunchStage::GeneratingToken);
        let grant = self
            .rooms
            .generate_token(&TokenRequest {
                room_name: room.room_name.clone(),
                participant_name: None,
                role: ParticipantRole::Student,
            })
            .await?;

        on_stage(&LaunchStage::Preparing);
        let bundle = SessionBundle {
            token: grant.token,
            participant: grant.participant,
            session: offer.clone(),
            server_url: grant.room.server_url,
            room,
        };
        self.storage.set(keys::CURRENT_SESSION, &bundle);

        on_stage(&LaunchStage::Ready {
            room_name: bundle.room.room_name.clone(),
        });
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_messages() {
        assert_eq!(LaunchStage::CreatingRoom.to_string(), "Creating room...");
        assert_eq!(
            LaunchStage::Ready {
                room_name: "tutor-1".to_string()
            }
            .to_string(),
            "Redirecting to session tutor-1..."
        );
    }
}
