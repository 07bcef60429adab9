//! HTTP client for the learnops backend
//!
//! Single point of outbound communication with one configured origin.
//! Every request carries JSON content headers, the tunnel's interstitial
//! bypass header and, when a token is stored, a bearer authorization header.
//!
//! A 401 on an ordinary endpoint runs the refresh protocol once:
//! - refresh succeeds: the original request is re-issued exactly once
//! - refresh fails: the sign-out hook runs and the call fails with
//!   [`ApiError::SessionExpired`]
//!
//! A 401 on a sign-out endpoint is treated as success. Nothing else is
//! retried.

use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::storage::{keys, Storage};

/// Header that tells the tunneling proxy to skip its browser warning page
pub const TUNNEL_HEADER: &str = "ngrok-skip-browser-warning";

/// Backend REST paths
pub mod endpoints {
    pub const AUTH_SIGNIN: &str = "/auth/signin";
    pub const AUTH_SIGNUP: &str = "/auth/signup";
    pub const AUTH_SIGNOUT: &str = "/auth/signout";
    pub const AUTH_REFRESH: &str = "/auth/refresh";
    pub const PROFILE: &str = "/profile";
    pub const LIVEKIT_HEALTH: &str = "/livekit/health";
    pub const LIVEKIT_CREATE_ROOM: &str = "/livekit/create-room";
    pub const LIVEKIT_GENERATE_TOKEN: &str = "/livekit/generate-token";
    pub const LIVEKIT_ACTIVE_ROOMS: &str = "/livekit/active-rooms";
    pub const HEALTH: &str = "/health";

    pub fn room_info(room_name: &str) -> String {
        format!("/livekit/room/{}/info", room_name)
    }

    pub fn delete_room(room_id: &str) -> String {
        format!("/livekit/room/{}", room_id)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timeout - Backend may be down")]
    Timeout,

    #[error("Session expired. Please sign in again.")]
    SessionExpired,

    #[error("Authentication required. Please login first.")]
    AuthRequired,

    /// Non-2xx response; message comes from the body's `error` field,
    /// the raw body, or the status line
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx response whose body failed shape validation
    #[error("{0}")]
    Backend(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(e)
        }
    }
}

/// Callbacks the client runs when a request comes back 401
#[async_trait]
pub trait AuthHooks: Send + Sync {
    /// Obtain a fresh access token; `Ok(false)` or an error both mean failure
    async fn refresh(&self) -> Result<bool, ApiError>;

    /// Drop all local credentials
    async fn sign_out(&self);
}

/// Backend API client
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    storage: Arc<Storage>,
    hooks: OnceLock<Weak<dyn AuthHooks>>,
}

impl ApiClient {
    /// Create new API client
    pub fn new(config: &ApiConfig, storage: Arc<Storage>) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            storage,
            hooks: OnceLock::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Register the refresh/sign-out hooks
    ///
    /// Only the first registration takes effect; returns whether this one did.
    pub fn register_auth_hooks(&self, hooks: Weak<dyn AuthHooks>) -> bool {
        let registered = self.hooks.set(hooks).is_ok();
        if !registered {
            tracing::warn!("Auth hooks already registered, ignoring");
        }
        registered
    }

    pub fn has_auth_hooks(&self) -> bool {
        self.auth_hooks().is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, None, HeaderMap::new()).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, endpoint, Some(body), HeaderMap::new()).await
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::POST, endpoint, None, HeaderMap::new()).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, endpoint, Some(body), HeaderMap::new()).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, endpoint, None, HeaderMap::new()).await
    }

    /// Issue a request with the refresh protocol applied
    ///
    /// `headers` are applied last and replace any default of the same name.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        headers: HeaderMap,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let sign_out_endpoint = is_sign_out_endpoint(endpoint);
        let mut is_retry = false;

        loop {
            tracing::debug!("{} {}{}", method, url, if is_retry { " (retry)" } else { "" });
            let resp = self.send_once(method.clone(), &url, body.as_ref(), &headers).await?;
            let status = resp.status();

            if status == StatusCode::UNAUTHORIZED && sign_out_endpoint {
                tracing::info!("Sign-out endpoint returned 401, token already invalid");
                return decode_body("");
            }

            if status == StatusCode::UNAUTHORIZED && !is_retry && refreshable(endpoint) {
                if let Some(hooks) = self.auth_hooks() {
                    tracing::info!("Token expired, attempting refresh");

                    let refreshed = match hooks.refresh().await {
                        Ok(ok) => ok,
                        Err(e) => {
                            tracing::error!("Token refresh error: {}", e);
                            false
                        }
                    };

                    if refreshed {
                        tracing::info!("Token refreshed, retrying {}", endpoint);
                        is_retry = true;
                        continue;
                    }

                    tracing::warn!("Token refresh failed, signing out");
                    hooks.sign_out().await;
                    return Err(ApiError::SessionExpired);
                }
            }

            if !status.is_success() {
                return Err(error_from_response(resp).await);
            }

            let text = resp.text().await.map_err(ApiError::from_transport)?;
            return decode_body(&text);
        }
    }

    /// Unauthenticated GET used for liveness checks; no refresh handling
    pub async fn probe(&self, endpoint: &str) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("GET {} (probe)", url);

        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json")
            .header(TUNNEL_HEADER, "true")
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: status_line(status),
            });
        }

        let text = resp.text().await.map_err(ApiError::from_transport)?;
        decode_body(&text)
    }

    /// CORS preflight against `endpoint`; returns the response status
    pub async fn preflight(&self, endpoint: &str, origin: &str) -> Result<StatusCode, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("OPTIONS {}", url);

        let resp = self
            .client
            .request(Method::OPTIONS, &url)
            .timeout(self.timeout)
            .header("Origin", origin)
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "Content-Type, Authorization")
            .header(TUNNEL_HEADER, "true")
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        Ok(resp.status())
    }

    // Private helpers

    fn auth_hooks(&self) -> Option<Arc<dyn AuthHooks>> {
        self.hooks.get().and_then(Weak::upgrade)
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static(TUNNEL_HEADER), HeaderValue::from_static("true"));

        if let Some(token) = self.storage.get_raw(keys::ACCESS_TOKEN) {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("Stored access token is not a valid header value"),
            }
        }

        headers
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        extra: &HeaderMap,
    ) -> Result<Response, ApiError> {
        let mut headers = self.default_headers();
        headers.extend(extra.clone());

        let mut req = self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .headers(headers);

        if let Some(body) = body {
            req = req.body(serde_json::to_vec(body)?);
        }

        req.send().await.map_err(ApiError::from_transport)
    }
}

/// Sign-out endpoints tolerate 401: an invalid token cannot be signed out twice
fn is_sign_out_endpoint(endpoint: &str) -> bool {
    endpoint.contains("/auth/signout") || endpoint.contains("/auth/logout") || endpoint.contains("/logout")
}

/// The refresh endpoint itself never triggers another refresh
fn refreshable(endpoint: &str) -> bool {
    !endpoint.starts_with(endpoints::AUTH_REFRESH)
}

fn status_line(status: StatusCode) -> String {
    format!("HTTP {}: {}", status.as_u16(), status.canonical_reason().unwrap_or(""))
}

async fn error_from_response(resp: Response) -> ApiError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let message = error_message(&text).unwrap_or_else(|| status_line(status));
    tracing::warn!("Request failed with {}: {}", status, message);

    ApiError::Http {
        status: status.as_u16(),
        message,
    }
}

/// Structured `error` field if the body is JSON, else the raw body text
fn error_message(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("error") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        },
        Ok(_) => None,
        Err(_) => (!body.trim().is_empty()).then(|| body.to_string()),
    }
}

/// Empty bodies decode as `{}`
fn decode_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Object(Default::default()))?);
    }
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base_url: &str) -> ApiClient {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        };
        ApiClient::new(&config, Arc::new(Storage::in_memory()))
    }

    #[test]
    fn test_url_normalization() {
        let api = client("http://localhost:5000/");
        assert_eq!(api.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_sign_out_endpoint_detection() {
        assert!(is_sign_out_endpoint("/auth/signout"));
        assert!(is_sign_out_endpoint("/auth/logout"));
        assert!(is_sign_out_endpoint("/v2/logout"));
        assert!(!is_sign_out_endpoint("/auth/signin"));
        assert!(!is_sign_out_endpoint("/profile"));
    }

    #[test]
    fn test_refresh_endpoint_not_refreshable() {
        assert!(!refreshable(endpoints::AUTH_REFRESH));
        assert!(refreshable(endpoints::PROFILE));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"error":"Invalid credentials"}"#).as_deref(), Some("Invalid credentials"));
        assert_eq!(error_message("Bad Gateway from tunnel").as_deref(), Some("Bad Gateway from tunnel"));
        assert_eq!(error_message(r#"{"message":"nope"}"#), None);
        assert_eq!(error_message(""), None);
        assert_eq!(error_message(r#"{"error":{"code":7}}"#).as_deref(), Some(r#"{"code":7}"#));
    }

    #[test]
    fn test_empty_body_decodes_as_object() {
        let value: Value = decode_body("").unwrap();
        assert_eq!(value, json!({}));

        let value: Value = decode_body("  \n").unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(StatusCode::BAD_GATEWAY), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_default_headers_include_bearer() {
        let api = client("http://localhost:5000");
        assert!(api.default_headers().get(AUTHORIZATION).is_none());

        api.storage().set(keys::ACCESS_TOKEN, "tok");
        let headers = api.default_headers();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(headers.get(TUNNEL_HEADER).unwrap(), "true");
    }

    struct NoopHooks;

    #[async_trait]
    impl AuthHooks for NoopHooks {
        async fn refresh(&self) -> Result<bool, ApiError> {
            Ok(false)
        }
        async fn sign_out(&self) {}
    }

    #[test]
    fn test_hooks_register_once() {
        let api = client("http://localhost:5000");
        let first: Arc<dyn AuthHooks> = Arc::new(NoopHooks);
        let second: Arc<dyn AuthHooks> = Arc::new(NoopHooks);

        assert!(api.register_auth_hooks(Arc::downgrade(&first)));
        assert!(!api.register_auth_hooks(Arc::downgrade(&second)));
        assert!(api.has_auth_hooks());

        drop(first);
        assert!(!api.has_auth_hooks());
    }
}
