//! JWT claim structures.
//!
//! - [`Claims`]: access token claims
//! - [`RefreshTokenClaims`]: refresh token claims

use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Distinguishes access from refresh tokens signed with the same secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by a short-lived access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// Role the user logged in with
    pub role_id: i64,
    pub kind: TokenKind,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::MalformedSubject)
    }
}

/// Claims carried by a long-lived refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub role_id: i64,
    pub kind: TokenKind,
    pub exp: usize,
    pub iat: usize,
    /// Unique token identifier (JWT ID) to ensure token uniqueness
    pub jti: String,
}

impl RefreshTokenClaims {
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::MalformedSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_deserialize() {
        let json = r#"{"sub":"42","role_id":3,"kind":"access","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role_id, 3);
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp, 9999999999);
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            role_id: 1,
            kind: TokenKind::Access,
            exp: 1,
            iat: 0,
        };
        assert!(matches!(claims.user_id(), Err(AuthError::MalformedSubject)));
    }

    #[test]
    fn test_refresh_claims_serialize() {
        let claims = RefreshTokenClaims {
            sub: "7".to_string(),
            role_id: 4,
            kind: TokenKind::Refresh,
            exp: 1234567890,
            iat: 1234567800,
            jti: "test-jti".to_string(),
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"7""#));
        assert!(serialized.contains(r#""jti":"test-jti""#));
        assert!(serialized.contains(r#""kind":"refresh""#));
    }
}
