//! Token issuance, verification, and request-gating middleware.

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation, decode, encode};
use log::warn;
use std::sync::Arc;

use super::{AuthConfig, AuthError, Claims, ConfigValidationError, RevocationList};

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Authentication state shared across handlers.
///
/// Owns the signing keys and the revocation registry. Constructed once at
/// startup and injected wherever a token decision is needed; tests build
/// isolated instances per case.
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    revoked: Arc<RevocationList>,
}

impl AuthState {
    /// Create auth state from config.
    ///
    /// Fails when the config is unusable (missing or weak secret, bad
    /// policy numbers); callers must treat that as fatal at startup.
    pub fn new(config: AuthConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;

        // validate() guarantees the secret resolves.
        let secret = config
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            revoked: Arc::new(RevocationList::new()),
        })
    }

    /// Get allowed CORS origins from config.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    /// Whether successful logins consume lockout attempts.
    pub fn lockout_counts_successful_logins(&self) -> bool {
        self.config.lockout_counts_successful_logins
    }

    /// Mint a signed session token for a verified administrator.
    ///
    /// Tokens are self-contained; nothing is stored server-side at issuance.
    pub fn issue_token(&self, id: i64, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            username: username.to_string(),
            is_admin: true,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.token_ttl_hours)).timestamp(),
        };

        encode(&jsonwebtoken::Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify a presented token and return its claims.
    ///
    /// The revocation check runs before any cryptographic evaluation so a
    /// revoked-but-otherwise-valid token can never be mistaken for valid.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        if self.revoked.is_revoked(token) {
            return Err(AuthError::TokenRevoked);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            warn!("token validation failed: {:?}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Verify a presented token and additionally require the admin flag.
    pub fn verify_admin_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify_token(token)?;
        if !claims.is_admin {
            return Err(AuthError::NotAdmin);
        }
        Ok(claims)
    }

    /// Revoke a token until its natural expiry.
    pub fn revoke_token(&self, token: &str, expires_at: i64) {
        self.revoked.revoke(token, expires_at);
    }

    /// The revocation registry backing this state.
    pub fn revocations(&self) -> &RevocationList {
        &self.revoked
    }
}

/// Authenticated session extracted from the request.
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    /// Verified token claims.
    pub claims: Claims,
    /// The raw token the client presented, kept for revocation on logout.
    pub token: String,
}

impl CurrentAdmin {
    /// Get the administrator ID.
    pub fn id(&self) -> i64 {
        self.claims.id
    }

    /// Get the administrator username.
    pub fn username(&self) -> &str {
        &self.claims.username
    }

    /// Check if the session carries the admin capability flag.
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin
    }
}

/// Extract the authenticated session from request extensions.
impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentAdmin>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Authentication middleware.
///
/// Validates the Bearer token (consulting the revocation registry) and
/// injects [`CurrentAdmin`] into request extensions. Any validly signed,
/// non-revoked, non-expired session passes; handlers that need the admin
/// capability use [`RequireAdmin`] on top.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = bearer_token_from_header(auth_header)?;
    let claims = auth.verify_token(token)?;
    let token = token.to_string();

    req.extensions_mut().insert(CurrentAdmin {
        claims,
        token,
    });

    Ok(next.run(req).await)
}

/// Require the admin capability flag.
///
/// Use as an extractor in handlers behind [`auth_middleware`] that must only
/// serve administrators.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<CurrentAdmin>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)?;

        if !session.is_admin() {
            return Err(AuthError::NotAdmin);
        }

        Ok(RequireAdmin(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth_state() -> AuthState {
        let config = AuthConfig {
            jwt_secret: Some("test-secret-for-unit-tests-minimum-32-chars".to_string()),
            ..AuthConfig::default()
        };
        AuthState::new(config).expect("valid test config")
    }

    /// Encode arbitrary claims with the same key the state verifies with.
    fn encode_claims(state: &AuthState, claims: &Claims) -> String {
        encode(&jsonwebtoken::Header::default(), claims, &state.encoding_key).unwrap()
    }

    #[test]
    fn test_bearer_token_from_header_valid() {
        assert_eq!(
            bearer_token_from_header("Bearer abc.def.ghi").unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            bearer_token_from_header("bearer   token123").unwrap(),
            "token123"
        );
    }

    #[test]
    fn test_bearer_token_from_header_invalid() {
        let cases = [
            "",
            "Bearer",
            "Bearer ",
            "Token something",
            "Bearer token extra",
            "bear token",
        ];

        for case in cases {
            assert!(
                bearer_token_from_header(case).is_err(),
                "{case} should fail"
            );
        }
    }

    #[test]
    fn test_auth_state_rejects_bad_config() {
        let config = AuthConfig {
            jwt_secret: Some("short".to_string()),
            ..AuthConfig::default()
        };
        assert!(AuthState::new(config).is_err());

        assert!(AuthState::new(AuthConfig::default()).is_err());
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let state = test_auth_state();

        let token = state.issue_token(7, "admin").unwrap();
        let claims = state.verify_token(&token).unwrap();

        assert_eq!(claims.id, 7);
        assert_eq!(claims.username, "admin");
        assert!(claims.is_admin);
        assert!(claims.exp > claims.iat);
        // 12 hour default lifetime
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let state = test_auth_state();
        let token = state.issue_token(1, "admin").unwrap();

        // Flip one character in the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(matches!(
            state.verify_token(&tampered),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let state = test_auth_state();
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: 1,
            username: "admin".to_string(),
            is_admin: true,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode_claims(&state, &claims);

        assert!(matches!(
            state.verify_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_revoked_token_rejected_before_signature_check() {
        let state = test_auth_state();
        let token = state.issue_token(1, "admin").unwrap();

        state.revoke_token(&token, Utc::now().timestamp() + 3600);

        // The token still carries a valid signature and is unexpired, but the
        // registry wins.
        assert!(matches!(
            state.verify_token(&token),
            Err(AuthError::TokenRevoked)
        ));
    }

    #[test]
    fn test_revoke_twice_same_as_once() {
        let state = test_auth_state();
        let token = state.issue_token(1, "admin").unwrap();
        let exp = Utc::now().timestamp() + 3600;

        state.revoke_token(&token, exp);
        state.revoke_token(&token, exp);

        assert!(matches!(
            state.verify_token(&token),
            Err(AuthError::TokenRevoked)
        ));
        assert_eq!(state.revocations().len(), 1);
    }

    #[test]
    fn test_verify_admin_token_requires_flag() {
        let state = test_auth_state();
        let now = Utc::now().timestamp();

        let claims = Claims {
            id: 2,
            username: "reader".to_string(),
            is_admin: false,
            iat: now,
            exp: now + 3600,
        };
        let token = encode_claims(&state, &claims);

        // Passes plain verification...
        assert!(state.verify_token(&token).is_ok());
        // ...but not the admin check.
        assert!(matches!(
            state.verify_admin_token(&token),
            Err(AuthError::NotAdmin)
        ));

        let admin_token = state.issue_token(1, "admin").unwrap();
        assert!(state.verify_admin_token(&admin_token).is_ok());
    }
}
