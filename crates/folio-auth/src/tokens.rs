//! Token issuing and sliding re-issue of access tokens.

use chrono::Utc;
use tracing::debug;

use folio_config::JwtConfig;

use crate::AuthError;
use crate::claims::Claims;
use crate::jwt::{
    access_claims, create_refresh_token, encode_access_token, verify_refresh_token, verify_token,
};

/// Tokens handed out at login.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access: String,
    /// Present only when the user asked to be remembered.
    pub refresh: Option<String>,
}

/// Outcome of validating a presented token.
#[derive(Debug, Clone)]
pub struct ValidatedToken {
    /// Claims of the token that is now current.
    pub claims: Claims,
    /// A freshly signed access token the caller should send back to the client.
    pub reissued: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TokenService {
    config: JwtConfig,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn token_name(&self) -> &str {
        &self.config.token_name
    }

    pub fn refresh_token_name(&self) -> String {
        self.config.refresh_token_name()
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl(&self) -> i64 {
        self.config.access_token_expiry
    }

    /// Refresh token lifetime in seconds.
    pub fn refresh_ttl(&self) -> i64 {
        self.config.refresh_token_expiry
    }

    pub fn issue(&self, user_id: i64, role_id: i64, remember: bool) -> Result<IssuedTokens, AuthError> {
        let access = encode_access_token(&access_claims(user_id, role_id, &self.config), &self.config)?;
        let refresh = if remember {
            Some(create_refresh_token(user_id, role_id, &self.config)?)
        } else {
            None
        };

        Ok(IssuedTokens { access, refresh })
    }

    /// Verifies an access token, re-issuing it when it is about to expire.
    ///
    /// # Errors
    ///
    /// Returns the verification error unchanged; callers fall back to the
    /// refresh token on any error.
    pub fn validate_and_refresh(&self, token: &str) -> Result<ValidatedToken, AuthError> {
        let claims = verify_token(token, &self.config)?;
        let user_id = claims.user_id()?;

        let remaining = claims.exp as i64 - Utc::now().timestamp();
        if remaining >= self.config.refresh_window {
            return Ok(ValidatedToken {
                claims,
                reissued: None,
            });
        }

        debug!(user_id, remaining, "Access token close to expiry, re-issuing");
        self.mint(user_id, claims.role_id)
    }

    /// Mints a new access token from a valid refresh token.
    pub fn refresh_from_token(&self, refresh_token: &str) -> Result<ValidatedToken, AuthError> {
        let refresh = verify_refresh_token(refresh_token, &self.config)?;
        let user_id = refresh.user_id()?;

        debug!(user_id, "Access token re-issued from refresh token");
        self.mint(user_id, refresh.role_id)
    }

    fn mint(&self, user_id: i64, role_id: i64) -> Result<ValidatedToken, AuthError> {
        let claims = access_claims(user_id, role_id, &self.config);
        let token = encode_access_token(&claims, &self.config)?;

        Ok(ValidatedToken {
            claims,
            reissued: Some(token),
        })
    }
}
