//! Request authentication and permission gates.
//!
//! [`authenticate`] runs on every request and never rejects: a missing,
//! invalid or expired token simply leaves the request anonymous. Routes that
//! need a user ask for one with [`Authenticated`] or one of the
//! `Require*` permission extractors, which redirect instead of erroring.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tower_sessions::Session;
use tracing::{debug, error, info, instrument, warn};

use folio_auth::TokenService;
use folio_cache::{FileCache, keys};
use folio_core::Permission;

use crate::context::{Identity, RequestContext, UserInfo};
use crate::modules::users::UserStore;
use crate::session::SessionKeys;
use crate::state::AppState;

/// Tokens presented by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

impl Credentials {
    /// Access token from the token cookie, else from `Authorization: Bearer`.
    /// Refresh token from the `{name}_refresh` cookie.
    pub fn from_headers(headers: &HeaderMap, tokens: &TokenService) -> Self {
        let jar = CookieJar::from_headers(headers);
        let cookie_value = |name: &str| {
            jar.get(name)
                .map(|cookie| cookie.value().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            access: cookie_value(tokens.token_name()).or_else(|| bearer_token(headers)),
            refresh: cookie_value(&tokens.refresh_token_name()),
        }
    }
}

/// Result of authenticating one request.
#[derive(Debug, Clone, Default)]
pub struct AuthOutcome {
    pub user: Option<UserInfo>,
    /// New access token to hand back to the client.
    pub reissued_access: Option<String>,
}

impl AuthOutcome {
    fn anonymous() -> Self {
        Self::default()
    }
}

/// Turns presented tokens into a user identity.
#[derive(Clone)]
pub struct AuthResolver {
    tokens: TokenService,
    cache: FileCache,
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for AuthResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResolver")
            .field("tokens", &self.tokens.token_name())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl AuthResolver {
    pub fn new(tokens: TokenService, cache: FileCache, users: Arc<dyn UserStore>) -> Self {
        Self {
            tokens,
            cache,
            users,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Runs the token state machine:
    ///
    /// ```text
    /// no token                          -> anonymous
    /// valid access token                -> authenticated (maybe re-issued)
    /// bad access token + valid refresh  -> authenticated, re-issued
    /// bad access token + bad/no refresh -> anonymous
    /// ```
    #[instrument(skip_all)]
    pub async fn handle(&self, credentials: &Credentials) -> AuthOutcome {
        let Some(access) = credentials.access.as_deref() else {
            return AuthOutcome::anonymous();
        };

        let validated = match self.tokens.validate_and_refresh(access) {
            Ok(validated) => validated,
            Err(e) => {
                debug!(reason = %e, "Access token rejected");
                let Some(refresh) = credentials.refresh.as_deref() else {
                    info!(reason = %e, "Access token rejected and no refresh token present");
                    return AuthOutcome::anonymous();
                };

                match self.tokens.refresh_from_token(refresh) {
                    Ok(validated) => validated,
                    Err(e) => {
                        info!(reason = %e, "Refresh token rejected");
                        return AuthOutcome::anonymous();
                    }
                }
            }
        };

        let user_id = match validated.claims.user_id() {
            Ok(user_id) => user_id,
            Err(e) => {
                info!(reason = %e, "Token subject rejected");
                return AuthOutcome::anonymous();
            }
        };

        match self.retrieve_user_info(user_id, validated.claims.role_id).await {
            Ok(user) => AuthOutcome {
                user: Some(user),
                reissued_access: validated.reissued,
            },
            Err(e) => {
                error!(user_id, error = %e, "Failed to load user for authenticated request");
                AuthOutcome::anonymous()
            }
        }
    }

    /// Profile and permission mask for a user, cached for ten minutes.
    ///
    /// A user missing from the store becomes an "Unknown" identity with no
    /// permissions. Store failures are returned and nothing is cached.
    #[instrument(skip(self))]
    pub async fn retrieve_user_info(&self, user_id: i64, role_id: i64) -> anyhow::Result<UserInfo> {
        let key = keys::user_permissions(user_id, role_id);
        if let Some(cached) = self.cache.get::<UserInfo>(&key).await {
            return Ok(cached);
        }

        let permissions = self.cache.role_permission(role_id).await.permission_set();

        let user = match self.users.find_by_id(user_id).await? {
            Some(user) => UserInfo {
                user_id: user.id,
                user_name: user.user_name,
                first_name: user.first_name,
                permissions,
                role_id,
                profile_picture_url: user.profile_picture_url.unwrap_or_default(),
                email: Some(user.email),
            },
            None => {
                warn!(user_id, "Token refers to a user that does not exist");
                UserInfo::unknown(user_id, role_id)
            }
        };

        self.cache
            .set(&key, &user, Some(keys::USER_INFO_TTL))
            .await;
        Ok(user)
    }

    /// Drops the cached record of `user_id` for every role.
    pub async fn forget_user(&self, user_id: i64) -> bool {
        self.cache
            .clear(Some(&keys::user_permissions_prefix(user_id)))
            .await
    }
}

/// HttpOnly, `SameSite=Lax` cookie holding a token.
pub fn token_cookie(name: String, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_secs.max(0)))
        .build()
}

/// Cookie that makes the browser drop `name`.
pub fn removal_cookie(name: String, secure: bool) -> Cookie<'static> {
    token_cookie(name, String::new(), 0, secure)
}

/// Lifetime of the access cookie. Remembered sessions keep the cookie as
/// long as the refresh token so an expired access token is still presented
/// and can be renewed.
pub fn access_cookie_max_age(tokens: &TokenService, remembered: bool) -> i64 {
    if remembered {
        tokens.refresh_ttl()
    } else {
        tokens.access_ttl()
    }
}

/// Attaches the caller's [`Identity`] to the request and refreshes the access
/// cookie when a new token was minted.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let credentials = Credentials::from_headers(req.headers(), state.auth.tokens());
    let outcome = state.auth.handle(&credentials).await;

    req.extensions_mut().insert(Identity(outcome.user));
    let response = next.run(req).await;

    match outcome.reissued_access {
        Some(token) if !sets_cookie(&response, state.auth.tokens().token_name()) => {
            let tokens = state.auth.tokens();
            let cookie = token_cookie(
                tokens.token_name().to_string(),
                token,
                access_cookie_max_age(tokens, credentials.refresh.is_some()),
                state.app_config.session.secure,
            );
            (CookieJar::new().add(cookie), response).into_response()
        }
        _ => response,
    }
}

/// Whether the handler already set (or removed) cookie `name`.
fn sets_cookie(response: &Response, name: &str) -> bool {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .any(|value| value.to_str().is_ok_and(|value| value.starts_with(&prefix)))
}

/// Why a gate turned the request away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRedirect {
    /// Not logged in: go to `/login`.
    Login,
    /// Logged in without the required permission: go to `/403`.
    Forbidden,
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        match self {
            AuthRedirect::Login => Redirect::to("/login").into_response(),
            AuthRedirect::Forbidden => Redirect::to("/403").into_response(),
        }
    }
}

fn current_user(parts: &Parts) -> Option<UserInfo> {
    if let Some(ctx) = parts.extensions.get::<RequestContext>() {
        return ctx.user.clone();
    }
    parts
        .extensions
        .get::<Identity>()
        .and_then(|identity| identity.0.clone())
}

/// Stores the requested URI so login can send the user back to it.
async fn remember_requested_uri(parts: &Parts) {
    let Some(session) = parts.extensions.get::<Session>() else {
        return;
    };

    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    if let Err(e) = session
        .insert(SessionKeys::REDIRECT_AFTER_LOGIN, &target)
        .await
    {
        warn!(error = %e, "Failed to store redirect target");
    }
}

/// Extractor for routes that need a logged-in user.
#[derive(Debug, Clone)]
pub struct Authenticated(pub UserInfo);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match current_user(parts) {
            Some(user) => Ok(Authenticated(user)),
            None => {
                remember_requested_uri(parts).await;
                info!(path = %parts.uri.path(), "Unauthenticated access, redirecting to login");
                Err(AuthRedirect::Login)
            }
        }
    }
}

/// Route layer that lets only logged-in users through.
pub async fn enforce_auth(req: Request, next: Next) -> Result<Response, AuthRedirect> {
    let (mut parts, body) = req.into_parts();
    Authenticated::from_request_parts(&mut parts, &()).await?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Checks one permission bit, for handlers that gate only part of their work.
pub fn enforce_permission(user: &UserInfo, permission: Permission) -> Result<(), AuthRedirect> {
    if user.has_permission(permission) {
        Ok(())
    } else {
        info!(user_id = user.user_id, permission = %permission, "Permission denied");
        Err(AuthRedirect::Forbidden)
    }
}

/// Generates an extractor that requires one permission bit.
#[macro_export]
macro_rules! require_permission {
    ($name:ident, $permission:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::context::UserInfo);

        impl<S> axum::extract::FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = $crate::middleware::auth::AuthRedirect;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &S,
            ) -> Result<Self, Self::Rejection> {
                let $crate::middleware::auth::Authenticated(user) =
                    <$crate::middleware::auth::Authenticated as axum::extract::FromRequestParts<S>>::from_request_parts(parts, state).await?;

                $crate::middleware::auth::enforce_permission(&user, $permission)?;

                Ok($name(user))
            }
        }
    };
}

require_permission!(RequireViewProjects, Permission::ViewProjects);
require_permission!(RequireEditProjects, Permission::EditProjects);
require_permission!(RequireDeleteProjects, Permission::DeleteProjects);
require_permission!(RequireViewPersonalInfo, Permission::ViewPersonalInfo);
require_permission!(RequireEditPersonalInfo, Permission::EditPersonalInfo);
require_permission!(RequireManageUsers, Permission::ManageUsers);
