use tracing::{info, instrument};

use folio_auth::{IssuedTokens, TokenService};
use folio_core::{AppError, verify_password};

use crate::modules::users::{User, UserStore};

use super::model::LoginRequest;

/// Where a successful login lands when no page asked for it.
pub const DEFAULT_LOGIN_REDIRECT: &str = "/admin";

pub struct AuthService;

impl AuthService {
    /// Checks the credentials and issues tokens.
    ///
    /// Returns `Ok(None)` for an unknown email or a wrong password; the caller
    /// decides how to word the rejection.
    #[instrument(skip(users, tokens, dto), fields(email = %dto.email))]
    pub async fn login_user(
        users: &dyn UserStore,
        tokens: &TokenService,
        dto: &LoginRequest,
    ) -> Result<Option<(User, IssuedTokens)>, AppError> {
        let Some(user) = users.find_by_email(dto.email.trim()).await? else {
            info!("Login attempt for unknown email");
            return Ok(None);
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            info!(user_id = user.id, "Login attempt with wrong password");
            return Ok(None);
        }

        let issued = tokens
            .issue(user.id, user.role_id, dto.remember_me)
            .map_err(|e| e.into_app_error())?;

        info!(user_id = user.id, remember_me = dto.remember_me, "User logged in");
        Ok(Some((user, issued)))
    }

    /// Keeps post-login redirects on this site.
    pub fn safe_redirect(target: Option<String>) -> String {
        target
            .filter(|target| target.starts_with('/') && !target.starts_with("//"))
            .unwrap_or_else(|| DEFAULT_LOGIN_REDIRECT.to_string())
    }
}
