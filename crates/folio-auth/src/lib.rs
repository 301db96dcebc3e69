//! # Folio Auth
//!
//! Token handling for the Folio back office.
//!
//! This crate provides:
//!
//! - [`claims`]: JWT claim structures for access and refresh tokens
//! - [`jwt`]: Token creation and verification utilities
//! - [`tokens`]: [`TokenService`], which issues token pairs and transparently
//!   re-issues access tokens that are about to expire
//!
//! # Token Types
//!
//! - **Access Token** ([`Claims`]): short-lived, sent as the `JWT_NAME` cookie
//!   or an `Authorization: Bearer` header
//! - **Refresh Token** ([`RefreshTokenClaims`]): long-lived, only issued when
//!   the user asks to be remembered, stored in the `{JWT_NAME}_refresh` cookie
//!
//! # Example
//!
//! ```ignore
//! use folio_auth::TokenService;
//! use folio_config::{ConfigConsumer, ConfigManager, JwtConfig};
//!
//! let view = ConfigManager::global().config_for(ConfigConsumer::TokenService)?;
//! let tokens = TokenService::new(JwtConfig::from_view(&view)?);
//!
//! let issued = tokens.issue(user_id, role_id, true)?;
//! let validated = tokens.validate_and_refresh(&issued.access)?;
//! println!("User ID: {}", validated.claims.sub);
//! ```

pub mod claims;
pub mod jwt;
pub mod tokens;

use folio_core::AppError;

// Re-export commonly used types at crate root
pub use claims::{Claims, RefreshTokenClaims, TokenKind};
pub use jwt::{create_access_token, create_refresh_token, verify_refresh_token, verify_token};
pub use tokens::{IssuedTokens, TokenService, ValidatedToken};

/// Why a token was rejected.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token subject is not a user id")]
    MalformedSubject,

    #[error("Failed to sign token")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Rejections render as 401, signing failures as 500.
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Encoding(e) => AppError::internal(e),
            other => AppError::unauthorized(other.to_string()),
        }
    }
}
