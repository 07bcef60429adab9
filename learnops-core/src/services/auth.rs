//! Authentication endpoints: sign-in, sign-up, sign-out, refresh

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{endpoints, ApiClient, ApiError};
use crate::models::User;

/// `{user, session: {access_token}}` shape returned by every auth endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub session: Option<SessionTokens>,
}

impl AuthResponse {
    pub fn access_token(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|s| s.access_token.as_deref())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionTokens {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// User record as the backend sends it; profile data sits in `user_metadata`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

pub struct AuthService {
    api: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.api
            .post(
                endpoints::AUTH_SIGNIN,
                &Credentials {
                    email,
                    password,
                    name: None,
                },
            )
            .await
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<AuthResponse, ApiError> {
        self.api
            .post(
                endpoints::AUTH_SIGNUP,
                &Credentials {
                    email,
                    password,
                    name: Some(name),
                },
            )
            .await
    }

    pub async fn sign_out(&self) -> Result<(), ApiError> {
        let _: Value = self.api.post_empty(endpoints::AUTH_SIGNOUT).await?;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<AuthResponse, ApiError> {
        self.api.post_empty(endpoints::AUTH_REFRESH).await
    }
}

/// Normalize a backend user record into a [`User`]
///
/// Name precedence: metadata full name, then `name`, then the email.
pub fn transform_user_data(raw: &RawUser, name: Option<&str>) -> User {
    let metadata = raw.user_metadata.as_ref();

    let display_name = metadata
        .and_then(|m| m.full_name.as_deref())
        .filter(|n| !n.is_empty())
        .or(name.filter(|n| !n.is_empty()))
        .unwrap_or(&raw.email)
        .to_string();

    User {
        id: raw.id.clone(),
        name: display_name,
        email: raw.email.clone(),
        avatar: metadata.and_then(|m| m.avatar_url.clone()),
    }
}
