//! Domain types shared by services, the session and the front end

use serde::{Deserialize, Serialize};

/// Signed-in user, held in memory for the session lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Server-side profile record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Profile {
    /// Name to show: full name if set, else the email
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Fields a user may change on their profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Video room descriptor returned by room creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_name: String,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub max_participants: u32,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub tutor_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Room creation parameters
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutor_type: Option<String>,
}

/// Role a participant joins a room with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    #[default]
    Student,
    Tutor,
}

/// Token request for joining a room
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub room_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
    pub role: ParticipantRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Room part of a token grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRoom {
    pub name: String,
    #[serde(default)]
    pub server_url: String,
}

/// Participant access token bound to one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGrant {
    pub token: String,
    pub participant: Participant,
    pub room: TokenRoom,
    #[serde(default)]
    pub expires_at: Option<f64>,
}

/// Entry of the active room listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRoom {
    pub room_name: String,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub num_participants: u32,
    #[serde(default)]
    pub max_participants: u32,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub tutor_type: String,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_from_backend_payload() {
        let room: Room = serde_json::from_value(json!({
            "roomName": "tutor-abc",
            "roomId": "RM_1",
            "serverUrl": "wss://elsewhere",
            "maxParticipants": 2,
            "subject": "Quantum Physics",
            "tutorType": "Dr. QuantumBot",
            "metadata": { "sessionType": "tutoring" },
            "createdAt": "2025-01-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(room.room_name, "tutor-abc");
        assert_eq!(room.max_participants, 2);
        assert_eq!(room.tutor_type, "Dr. QuantumBot");
    }

    #[test]
    fn test_token_request_serialization() {
        let req = TokenRequest {
            room_name: "tutor-abc".to_string(),
            participant_name: None,
            role: ParticipantRole::Student,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({ "roomName": "tutor-abc", "role": "student" }));
    }

    #[test]
    fn test_profile_display_name() {
        let mut profile = Profile {
            id: "u1".to_string(),
            email: "ada@example.com".to_string(),
            full_name: None,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(profile.display_name(), "ada@example.com");

        profile.full_name = Some("Ada Lovelace".to_string());
        assert_eq!(profile.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_profile_update_skips_unset() {
        let value = serde_json::to_value(ProfileUpdate::default()).unwrap();
        assert_eq!(value, json!({}));
    }
}
