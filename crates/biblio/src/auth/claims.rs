//! Session token claims.

use serde::{Deserialize, Serialize};

/// Claims carried inside a signed session token.
///
/// The shape is fixed: every token minted by this backend has exactly these
/// fields, so handlers never have to probe an open-ended map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Administrator ID.
    pub id: i64,

    /// Administrator username.
    pub username: String,

    /// Administrator capability flag. Always true for tokens minted by this
    /// backend; checked again at verification time.
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Check whether the token has expired relative to `now` (Unix timestamp).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> Claims {
        Claims {
            id: 1,
            username: "admin".to_string(),
            is_admin: true,
            iat: 1_700_000_000,
            exp: 1_700_043_200,
        }
    }

    #[test]
    fn test_claims_serialization_uses_wire_names() {
        let claims = sample_claims();
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["username"], "admin");
        assert_eq!(json["isAdmin"], true);
        assert!(json.get("is_admin").is_none());
    }

    #[test]
    fn test_claims_round_trip() {
        let claims = sample_claims();
        let json = serde_json::to_string(&claims).unwrap();
        let decoded: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_claims_expiry() {
        let claims = sample_claims();
        assert!(!claims.is_expired_at(claims.exp - 1));
        assert!(claims.is_expired_at(claims.exp));
        assert!(claims.is_expired_at(claims.exp + 1));
    }
}
