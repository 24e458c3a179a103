//! API request handlers.
//!
//! - `auth`: login, logout, session, password change
//! - `misc`: health check

mod auth;
mod misc;

pub use auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, SessionResponse,
    change_password, login, logout, session,
};
pub use misc::{HealthResponse, health};
