//! Authentication handlers.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, State},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::admin::AdminInfo;
use crate::auth::{CurrentAdmin, RequireAdmin, ThrottleDecision};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: AdminInfo,
}

/// Simple success envelope for operations with no payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Administrator login endpoint.
///
/// Gated by the per-address throttle before the credential store is
/// consulted; the gate consumes an attempt whether or not the credentials
/// turn out to be valid.
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    if let ThrottleDecision::Blocked {
        retry_after_minutes,
    } = state.throttle.gate(addr.ip())
    {
        warn!(client = %addr.ip(), "Login attempt blocked by throttle");
        return Err(ApiError::too_many_requests(format!(
            "Too many login attempts. Try again in {} minutes",
            retry_after_minutes
        )));
    }

    let admin = state
        .admins
        .verify_credentials(&request.username, &request.password)
        .await?
        .ok_or_else(|| {
            warn!(client = %addr.ip(), "Invalid login credentials");
            ApiError::unauthorized("Invalid credentials")
        })?;

    if !state.auth.lockout_counts_successful_logins() {
        state.throttle.clear(addr.ip());
    }

    if let Err(e) = state.admins.record_login(admin.id).await {
        warn!(admin_id = admin.id, error = %e, "Failed to record login timestamp");
    }

    let token = state.auth.issue_token(admin.id, &admin.username)?;

    info!(admin_id = admin.id, "Administrator logged in");

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: AdminInfo::from(&admin),
    }))
}

/// Logout endpoint: revokes the presented token until its natural expiry.
#[instrument(skip(state, session))]
pub async fn logout(
    State(state): State<AppState>,
    session: CurrentAdmin,
) -> Json<MessageResponse> {
    state.auth.revoke_token(&session.token, session.claims.exp);

    info!(admin_id = session.id(), "Administrator logged out");

    Json(MessageResponse {
        success: true,
        message: "Session closed".to_string(),
    })
}

/// Current session info.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user: AdminInfo,
}

/// Get the authenticated administrator's identity.
pub async fn session(RequireAdmin(session): RequireAdmin) -> Json<SessionResponse> {
    Json(SessionResponse {
        success: true,
        user: AdminInfo {
            id: session.id(),
            username: session.username().to_string(),
            is_admin: true,
        },
    })
}

/// Request body for changing the administrator password.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Change the authenticated administrator's password.
///
/// Re-verifies the current password against the credential store before
/// accepting the new one.
#[instrument(skip(state, session, request))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if request.current_password.is_empty() || request.new_password.is_empty() {
        return Err(ApiError::bad_request(
            "Current and new password are required",
        ));
    }

    let verified = state
        .admins
        .verify_credentials(session.username(), &request.current_password)
        .await?;

    if verified.is_none() {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    state
        .admins
        .change_password(session.id(), &request.new_password)
        .await?;

    info!(admin_id = session.id(), "Password changed");

    Ok(Json(MessageResponse {
        success: true,
        message: "Password changed successfully".to_string(),
    }))
}
