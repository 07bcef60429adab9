//! learnops-core: client library for the learnops tutoring backend
//!
//! This crate provides:
//! - Persistent key-value storage for tokens and the session bundle
//! - HTTP client with the single-retry 401 refresh protocol
//! - Auth, profile and room/token services
//! - Auth session state and the session launch flow
//! - Room view model (chat, media toggles, whiteboard)
//! - Form validation and connectivity diagnostics

pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod diagnostics;
pub mod launch;
pub mod models;
pub mod room;
pub mod services;
pub mod session;
pub mod storage;
pub mod validation;
pub mod whiteboard;

pub use api::{ApiClient, ApiError, AuthHooks};
pub use config::Config;
pub use diagnostics::{Diagnostics, TestResult, TestStatus};
pub use launch::{LaunchStage, Launcher, SessionBundle};
pub use models::{Profile, Room, User};
pub use room::RoomView;
pub use services::{AuthService, ProfileService, RoomService};
pub use session::AuthSession;
pub use storage::Storage;

/// Default backend origin (tunnel in front of the API server)
pub const DEFAULT_API_URL: &str = "https://5616-106-215-170-8.ngrok-free.app";

/// Default hosted video transport endpoint
pub const DEFAULT_LIVEKIT_URL: &str = "wss://learnops-7m0x0o41.livekit.cloud";

/// Per-request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
