//! Profile read/update

use std::sync::Arc;

use serde::Deserialize;

use crate::api::{endpoints, ApiClient, ApiError};
use crate::models::{Profile, ProfileUpdate};

/// `{profile: ...}` envelope; an absent profile is never an empty success
#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    #[serde(default)]
    profile: Option<Profile>,
}

pub struct ProfileService {
    api: Arc<ApiClient>,
}

impl ProfileService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        let envelope: ProfileEnvelope = self.api.get(endpoints::PROFILE).await?;
        envelope
            .profile
            .ok_or_else(|| ApiError::Backend("Profile not found".to_string()))
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        let envelope: ProfileEnvelope = self.api.put(endpoints::PROFILE, update).await?;
        envelope
            .profile
            .ok_or_else(|| ApiError::Backend("Failed to update profile".to_string()))
    }
}
