#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use learnops_core::config::ApiConfig;
use learnops_core::{ApiClient, ApiError, AuthHooks, Storage};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TRANSPORT_URL: &str = "wss://transport.test";

pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        livekit_url: TRANSPORT_URL.to_string(),
        timeout_ms: 2_000,
    }
}

pub fn api_client(server: &MockServer) -> Arc<ApiClient> {
    Arc::new(ApiClient::new(&api_config(server), Arc::new(Storage::in_memory())))
}

pub fn auth_body(token: &str) -> Value {
    json!({
        "user": {
            "id": "user-1",
            "email": "ada@example.com",
            "user_metadata": { "full_name": "Ada Lovelace" }
        },
        "session": { "access_token": token }
    })
}

pub fn profile_body() -> Value {
    json!({
        "profile": {
            "id": "user-1",
            "email": "ada@example.com",
            "full_name": "Ada Lovelace",
            "created_at": "2024-01-01T00:00:00Z"
        }
    })
}

/// Hooks that count their invocations
pub struct CountingHooks {
    refresh_result: bool,
    pub refreshes: AtomicUsize,
    pub sign_outs: AtomicUsize,
}

impl CountingHooks {
    pub fn new(refresh_result: bool) -> Arc<Self> {
        Arc::new(Self {
            refresh_result,
            refreshes: AtomicUsize::new(0),
            sign_outs: AtomicUsize::new(0),
        })
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthHooks for CountingHooks {
    async fn refresh(&self) -> Result<bool, ApiError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(self.refresh_result)
    }

    async fn sign_out(&self) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn register(api: &ApiClient, hooks: &Arc<CountingHooks>) {
    let hooks: Arc<dyn AuthHooks> = Arc::clone(hooks) as Arc<dyn AuthHooks>;
    assert!(api.register_auth_hooks(Arc::downgrade(&hooks)));
}

/// Number of requests the mock server saw for `path`
pub async fn hits(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == path)
        .count()
}
