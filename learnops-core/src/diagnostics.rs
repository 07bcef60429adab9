//! Connectivity checks against the configured backend
//!
//! Runs six checks in order. A failed health check skips everything after
//! it; a failed auth step skips the steps that depend on it. The throwaway
//! `test_token` is removed when the run ends, whatever the outcome.

use std::sync::Arc;

use chrono::{Local, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{endpoints, ApiClient, ApiError};
use crate::storage::{keys, Storage};

/// Origin sent with the CORS preflight
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

pub const TEST_PASSWORD: &str = "TestPassword123!";
pub const TEST_NAME: &str = "Test User";

pub const CHECKS: [&str; 6] = [
    "Backend Health Check",
    "CORS Configuration",
    "Auth Signup",
    "Auth Signin",
    "Profile Access",
    "Database Connection",
];

const HEALTH: usize = 0;
const CORS: usize = 1;
const SIGNUP: usize = 2;
const SIGNIN: usize = 3;
const PROFILE: usize = 4;
const DATABASE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub message: String,
    pub details: Option<Value>,
    pub timestamp: Option<String>,
}

impl TestResult {
    fn pending(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: TestStatus::Pending,
            message: message.to_string(),
            details: None,
            timestamp: None,
        }
    }
}

/// Results before any run
pub fn initial_results() -> Vec<TestResult> {
    CHECKS.iter().map(|name| TestResult::pending(name, "Not tested yet")).collect()
}

/// Credentials of the throwaway account a run signs up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl TestUser {
    pub fn generate() -> Self {
        Self {
            email: format!("test-{}@example.com", Utc::now().timestamp_millis()),
            password: TEST_PASSWORD.to_string(),
            name: TEST_NAME.to_string(),
        }
    }
}

pub struct Diagnostics {
    api: Arc<ApiClient>,
    storage: Arc<Storage>,
    origin: String,
}

impl Diagnostics {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let storage = Arc::clone(api.storage());
        Self {
            api,
            storage,
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Run every check; `on_update` sees the full result list after each change
    pub async fn run_all(&self, on_update: impl FnMut(&[TestResult])) -> Vec<TestResult> {
        let mut report = Report::new(on_update);
        tracing::info!("Running connectivity checks against {}", self.api.base_url());

        self.run_checks(&mut report, TestUser::generate()).await;

        self.storage.remove(keys::TEST_TOKEN);
        report.results
    }

    /// GET the health endpoint
    pub async fn check_health(&self) -> Result<Value, ApiError> {
        self.api.get(endpoints::HEALTH).await
    }

    /// Preflight the health endpoint; accepted when the status is 2xx
    pub async fn check_cors(&self) -> Result<(), String> {
        match self.api.preflight(endpoints::HEALTH, &self.origin).await {
            Ok(status) if status.is_success() => Ok(()),
            Ok(status) => Err(format!("CORS issue: {}", status)),
            Err(e) => Err(format!("CORS test failed: {}", e)),
        }
    }

    async fn run_checks<F: FnMut(&[TestResult])>(&self, report: &mut Report<F>, user: TestUser) {
        report.reset();

        match self.check_health().await {
            Ok(health) => {
                let service = health
                    .get("service")
                    .and_then(Value::as_str)
                    .unwrap_or("Flask API")
                    .to_string();
                report.pass(HEALTH, format!("Backend is running: {}", service), Some(health));
            }
            Err(e) => {
                report.fail(HEALTH, format!("Backend not accessible: {}", e), None);
                report.skip_from(CORS, "Skipped - Backend not accessible");
                return;
            }
        }

        match self.check_cors().await {
            Ok(()) => report.pass(CORS, "CORS is properly configured", None),
            Err(message) => report.fail(CORS, message, None),
        }

        let signup_body = json!({
            "email": user.email,
            "password": user.password,
            "name": user.name,
        });
        match self.api.post::<Value, _>(endpoints::AUTH_SIGNUP, &signup_body).await {
            Ok(resp) => report.pass(SIGNUP, "User signup successful", Some(resp)),
            Err(e) => {
                report.fail(SIGNUP, format!("Signup failed: {}", e), None);
                report.skip_from(SIGNIN, "Skipped - Signup failed");
                return;
            }
        }

        let signin_body = json!({ "email": user.email, "password": user.password });
        let token = match self.api.post::<Value, _>(endpoints::AUTH_SIGNIN, &signin_body).await {
            Ok(resp) => {
                let token = resp
                    .pointer("/session/access_token")
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty())
                    .map(String::from);

                match token {
                    Some(token) => {
                        self.storage.set(keys::TEST_TOKEN, &token);
                        report.pass(SIGNIN, "User signin successful", Some(resp));
                        token
                    }
                    None => {
                        report.fail(SIGNIN, "Signin successful but no access token received", Some(resp));
                        report.skip_from(PROFILE, "Skipped - No access token");
                        return;
                    }
                }
            }
            Err(e) => {
                report.fail(SIGNIN, format!("Signin failed: {}", e), None);
                report.skip_from(PROFILE, "Skipped - Signin failed");
                return;
            }
        };

        match self.fetch_profile_with(&token).await {
            Ok(resp) => {
                report.pass(PROFILE, "Profile access successful", Some(resp.clone()));

                let profile = resp.get("profile").filter(|p| p.get("id").is_some_and(|id| !id.is_null()));
                match profile {
                    Some(profile) => report.pass(
                        DATABASE,
                        "Database connection working - Profile found in Supabase",
                        Some(profile.clone()),
                    ),
                    None => report.fail(DATABASE, "Database issue - No profile data found", Some(resp.clone())),
                }
            }
            Err(e) => {
                report.fail(PROFILE, format!("Profile access failed: {}", e), None);
                report.fail(DATABASE, "Database test failed - Could not access profile", None);
            }
        }
    }

    async fn fetch_profile_with(&self, token: &str) -> Result<Value, ApiError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Backend("Test token is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);

        self.api.request(Method::GET, endpoints::PROFILE, None, headers).await
    }
}

struct Report<F> {
    results: Vec<TestResult>,
    on_update: F,
}

impl<F: FnMut(&[TestResult])> Report<F> {
    fn new(on_update: F) -> Self {
        Self {
            results: initial_results(),
            on_update,
        }
    }

    fn reset(&mut self) {
        self.results = CHECKS.iter().map(|name| TestResult::pending(name, "Testing...")).collect();
        (self.on_update)(&self.results);
    }

    fn pass(&mut self, index: usize, message: impl Into<String>, details: Option<Value>) {
        self.set(index, TestStatus::Success, message.into(), details);
    }

    fn fail(&mut self, index: usize, message: impl Into<String>, details: Option<Value>) {
        let message = message.into();
        tracing::warn!("{}: {}", CHECKS[index], message);
        self.set(index, TestStatus::Error, message, details);
    }

    fn skip_from(&mut self, first: usize, message: &str) {
        for index in first..self.results.len() {
            self.set(index, TestStatus::Error, message.to_string(), None);
        }
    }

    fn set(&mut self, index: usize, status: TestStatus, message: String, details: Option<Value>) {
        let result = &mut self.results[index];
        result.status = status;
        result.message = message;
        result.details = details;
        result.timestamp = Some(Local::now().format("%H:%M:%S").to_string());
        (self.on_update)(&self.results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_results() {
        let results = initial_results();
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.status == TestStatus::Pending));
        assert_eq!(results[0].name, "Backend Health Check");
        assert_eq!(results[5].name, "Database Connection");
    }

    #[test]
    fn test_generated_user() {
        let user = TestUser::generate();
        assert!(user.email.starts_with("test-"));
        assert!(user.email.ends_with("@example.com"));
        assert_eq!(user.password, TEST_PASSWORD);
    }

    #[test]
    fn test_skip_cascade() {
        let mut updates = 0;
        let mut report = Report::new(|_: &[TestResult]| updates += 1);
        report.fail(HEALTH, "down", None);
        report.skip_from(CORS, "Skipped - Backend not accessible");

        assert!(report.results.iter().all(|r| r.status == TestStatus::Error));
        assert_eq!(report.results[DATABASE].message, "Skipped - Backend not accessible");
        assert!(report.results[SIGNUP].timestamp.is_some());
        drop(report);
        assert_eq!(updates, 6);
    }
}
