//! Typed facades over [`ApiClient`](crate::api::ApiClient), one per resource family

pub mod auth;
pub mod profile;
pub mod rooms;

pub use auth::{AuthResponse, AuthService};
pub use profile::ProfileService;
pub use rooms::{Reply, RoomService};
