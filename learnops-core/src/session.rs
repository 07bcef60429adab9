//! Authenticated session state
//!
//! Holds at most one signed-in [`User`]. The stored access token is the
//! source of truth: its presence at start-up triggers a profile fetch that
//! hydrates the user, never the other way round.
//!
//! Construction registers the session as the api client's [`AuthHooks`], so a
//! 401 anywhere in the app can refresh the token without the call site
//! knowing about auth.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::api::{ApiClient, ApiError, AuthHooks};
use crate::models::User;
use crate::services::auth::{transform_user_data, AuthResponse, AuthService, RawUser, UserMetadata};
use crate::services::ProfileService;
use crate::storage::{keys, Storage};

pub struct AuthSession {
    auth: AuthService,
    profiles: ProfileService,
    storage: Arc<Storage>,
    user: RwLock<Option<User>>,
    loading: AtomicUsize,
}

impl AuthSession {
    /// Build the session and register it with `api`
    pub fn new(api: Arc<ApiClient>) -> Arc<Self> {
        let session = Arc::new(Self {
            auth: AuthService::new(Arc::clone(&api)),
            profiles: ProfileService::new(Arc::clone(&api)),
            storage: Arc::clone(api.storage()),
            user: RwLock::new(None),
            loading: AtomicUsize::new(0),
        });

        let hooks: Weak<dyn AuthHooks> = Arc::downgrade(&session) as Weak<dyn AuthHooks>;
        api.register_auth_hooks(hooks);

        session
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Silent start-up check; always resolves, at worst to signed out
    pub async fn initialize(&self) {
        let _loading = LoadingGuard::start(&self.loading);

        if !self.storage.contains(keys::ACCESS_TOKEN) {
            tracing::debug!("No stored token, starting signed out");
            self.set_user(None).await;
            return;
        }

        match self.profiles.get_profile().await {
            Ok(profile) => {
                let raw = RawUser {
                    id: profile.id,
                    email: profile.email,
                    user_metadata: Some(UserMetadata {
                        full_name: profile.full_name,
                        avatar_url: None,
                    }),
                };
                let user = transform_user_data(&raw, None);
                tracing::info!("Restored session for {}", user.email);
                self.set_user(Some(user)).await;
            }
            Err(e) => {
                tracing::warn!("Auth check failed, starting signed out: {}", e);
                self.clear_local().await;
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let _loading = LoadingGuard::start(&self.loading);
        tracing::info!("Signing in {}", email);

        let resp = self.auth.sign_in(email, password).await.inspect_err(|e| {
            tracing::error!("Sign in failed: {}", e);
        })?;
        self.accept(resp, None).await
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User, ApiError> {
        let _loading = LoadingGuard::start(&self.loading);
        tracing::info!("Signing up {}", email);

        let resp = self.auth.sign_up(email, password, name).await.inspect_err(|e| {
            tracing::error!("Sign up failed: {}", e);
        })?;
        self.accept(resp, Some(name)).await
    }

    /// Best-effort remote sign-out; local credentials are always dropped
    pub async fn sign_out(&self) {
        let _loading = LoadingGuard::start(&self.loading);

        if let Err(e) = self.auth.sign_out().await {
            tracing::warn!("Remote sign out failed: {}", e);
        }
        self.clear_local().await;
        tracing::info!("Signed out");
    }

    /// Rotate the access token; never fails, returns whether it worked
    pub async fn refresh(&self) -> bool {
        let resp = match self.auth.refresh().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                self.clear_local().await;
                return false;
            }
        };

        match self.accept(resp, None).await {
            Ok(user) => {
                tracing::info!("Token refreshed for {}", user.email);
                true
            }
            Err(_) => {
                self.clear_local().await;
                false
            }
        }
    }

    // Private helpers

    /// Persist the token and populate the user from an auth response
    async fn accept(&self, resp: AuthResponse, name: Option<&str>) -> Result<User, ApiError> {
        let Some(token) = resp.access_token() else {
            return Err(ApiError::Backend("No access token received".to_string()));
        };
        self.storage.set(keys::ACCESS_TOKEN, token);

        let raw = resp.user.unwrap_or_default();
        let user = transform_user_data(&raw, name);
        self.set_user(Some(user.clone())).await;
        Ok(user)
    }

    async fn clear_local(&self) {
        self.storage.remove(keys::ACCESS_TOKEN);
        self.set_user(None).await;
    }

    async fn set_user(&self, user: Option<User>) {
        *self.user.write().await = user;
    }
}

#[async_trait]
impl AuthHooks for AuthSession {
    async fn refresh(&self) -> Result<bool, ApiError> {
        Ok(AuthSession::refresh(self).await)
    }

    async fn sign_out(&self) {
        AuthSession::sign_out(self).await
    }
}

/// Counts one in-flight operation. Operations nest: a 401 inside sign-in
/// can run the sign-out hook before the outer call finishes.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn start(depth: &'a AtomicUsize) -> Self {
        depth.fetch_add(1, Ordering::SeqCst);
        Self(depth)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_guard_keeps_loading() {
        let depth = AtomicUsize::new(0);
        let outer = LoadingGuard::start(&depth);
        {
            let _inner = LoadingGuard::start(&depth);
            assert_eq!(depth.load(Ordering::SeqCst), 2);
        }
        assert_eq!(depth.load(Ordering::SeqCst), 1);
        drop(outer);
        assert_eq!(depth.load(Ordering::SeqCst), 0);
    }
}
