//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No Authorization header on the request.
    #[error("access denied, no token provided")]
    MissingAuthHeader,

    /// Authorization header present but not a usable `Bearer <token>`.
    #[error("access denied, invalid authorization header")]
    InvalidAuthHeader,

    /// Signature invalid or claims undecodable.
    #[error("invalid token")]
    InvalidToken(String),

    /// Token past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// Token was explicitly revoked before expiry.
    #[error("token has been revoked")]
    TokenRevoked,

    /// Valid token, but the administrator capability flag is absent.
    #[error("access forbidden, administrator privileges required")]
    NotAdmin,

    /// Internal error.
    #[error("internal authentication error")]
    Internal(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => StatusCode::UNAUTHORIZED,
            AuthError::NotAdmin => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body. Matches the catalog API's envelope: every failure is
/// `{"success": false, "message": "..."}` with no internal detail.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // The InvalidToken/Internal payloads stay in the logs only.
        match &self {
            AuthError::InvalidToken(detail) => {
                log::warn!("rejected token: {detail}");
            }
            AuthError::Internal(detail) => {
                log::error!("auth internal error: {detail}");
            }
            _ => {}
        }

        let body = Json(AuthErrorResponse {
            success: false,
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::MissingAuthHeader;
        assert_eq!(err.to_string(), "access denied, no token provided");

        let err = AuthError::InvalidToken("bad signature".to_string());
        assert_eq!(err.to_string(), "invalid token");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::MissingAuthHeader.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenRevoked.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenExpired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::NotAdmin.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::Internal("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
