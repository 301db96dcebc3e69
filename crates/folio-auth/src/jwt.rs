//! JWT creation and verification.
//!
//! Both token flavours are HS256 JWTs signed with `JWT_SECRET`. They carry
//! the user id (`sub`), the role id and a [`TokenKind`] so a refresh token
//! can never be presented as an access token or the other way round.
//!
//! # Example
//!
//! ```ignore
//! use folio_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(42, 1, &jwt_config)?;
//! let claims = verify_token(&token, &jwt_config)?;
//! assert_eq!(claims.user_id()?, 42);
//! ```

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use folio_config::JwtConfig;

use crate::AuthError;
use crate::claims::{Claims, RefreshTokenClaims, TokenKind};

fn expiry_from_now(now: i64, lifetime: i64) -> usize {
    now.saturating_add(lifetime).max(0) as usize
}

fn decode_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Invalid,
    }
}

/// Builds access claims for `user_id` without signing them.
pub fn access_claims(user_id: i64, role_id: i64, jwt_config: &JwtConfig) -> Claims {
    let now = Utc::now().timestamp();

    Claims {
        sub: user_id.to_string(),
        role_id,
        kind: TokenKind::Access,
        exp: expiry_from_now(now, jwt_config.access_token_expiry),
        iat: now.max(0) as usize,
    }
}

/// Signs access claims.
///
/// # Errors
///
/// Returns [`AuthError::Encoding`] if signing fails.
pub fn encode_access_token(claims: &Claims, jwt_config: &JwtConfig) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(AuthError::Encoding)
}

/// Creates a short-lived access token.
pub fn create_access_token(
    user_id: i64,
    role_id: i64,
    jwt_config: &JwtConfig,
) -> Result<String, AuthError> {
    encode_access_token(&access_claims(user_id, role_id, jwt_config), jwt_config)
}

/// Verifies an access token and returns its claims.
///
/// # Errors
///
/// - [`AuthError::Expired`] when the token is past its `exp`
/// - [`AuthError::Invalid`] for bad signatures, malformed tokens and refresh tokens
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AuthError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(decode_error)?;

    if claims.kind != TokenKind::Access {
        return Err(AuthError::Invalid);
    }

    Ok(claims)
}

/// Creates a long-lived refresh token.
pub fn create_refresh_token(
    user_id: i64,
    role_id: i64,
    jwt_config: &JwtConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();

    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        role_id,
        kind: TokenKind::Refresh,
        exp: expiry_from_now(now, jwt_config.refresh_token_expiry),
        iat: now.max(0) as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(AuthError::Encoding)
}

/// Verifies a refresh token and returns its claims.
pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshTokenClaims, AuthError> {
    let claims = decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(decode_error)?;

    if claims.kind != TokenKind::Refresh {
        return Err(AuthError::Invalid);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            token_name: "portfolio_token".to_string(),
            access_token_expiry: 1800,
            refresh_token_expiry: 604800,
            refresh_window: 300,
        }
    }

    #[test]
    fn test_verify_token_success() {
        let config = get_test_jwt_config();
        let token = create_access_token(42, 2, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role_id, 2);
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_verify_token_invalid() {
        let config = get_test_jwt_config();
        assert!(matches!(
            verify_token("invalid-token", &config),
            Err(AuthError::Invalid)
        ));
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let config = get_test_jwt_config();
        let token = create_access_token(1, 1, &config).unwrap();

        let wrong_config = JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..get_test_jwt_config()
        };

        assert!(verify_token(&token, &wrong_config).is_err());
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let config = JwtConfig {
            access_token_expiry: -3600,
            ..get_test_jwt_config()
        };
        let token = create_access_token(1, 1, &config).unwrap();

        assert!(matches!(
            verify_token(&token, &get_test_jwt_config()),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_verify_refresh_token_success() {
        let config = get_test_jwt_config();
        let token = create_refresh_token(9, 4, &config).unwrap();
        let claims = verify_refresh_token(&token, &config).unwrap();

        assert_eq!(claims.user_id().unwrap(), 9);
        assert_eq!(claims.role_id, 4);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let config = get_test_jwt_config();
        let access = create_access_token(1, 1, &config).unwrap();
        let refresh = create_refresh_token(1, 1, &config).unwrap();

        assert!(verify_refresh_token(&access, &config).is_err());
        assert!(matches!(
            verify_token(&refresh, &config),
            Err(AuthError::Invalid)
        ));
    }

    #[test]
    fn test_refresh_token_expiry_longer_than_access() {
        let config = get_test_jwt_config();
        let access = verify_token(&create_access_token(1, 1, &config).unwrap(), &config).unwrap();
        let refresh =
            verify_refresh_token(&create_refresh_token(1, 1, &config).unwrap(), &config).unwrap();

        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_huge_lifetime_saturates() {
        assert_eq!(expiry_from_now(1_000, i64::MAX), i64::MAX as usize);
        assert_eq!(expiry_from_now(1_000, i64::MIN), 0);

        let config = JwtConfig {
            access_token_expiry: i64::MAX,
            refresh_token_expiry: i64::MAX,
            ..get_test_jwt_config()
        };
        let claims = access_claims(7, 1, &config);
        assert_eq!(claims.exp, i64::MAX as usize);
        assert!(create_refresh_token(7, 1, &config).is_ok());
    }
}
