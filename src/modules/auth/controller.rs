use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tower_sessions::Session;
use tracing::{instrument, warn};

use folio_core::AppError;

use crate::context::RequestContext;
use crate::middleware::auth::{access_cookie_max_age, removal_cookie, token_cookie};
use crate::session::SessionKeys;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{LoginRequest, LoginResponse, LoginStatus, MessageResponse};
use super::service::{AuthService, DEFAULT_LOGIN_REDIRECT};

/// Tells the login page whether the caller is already signed in.
#[instrument(skip(ctx))]
pub async fn login_status(ctx: RequestContext) -> Json<LoginStatus> {
    let authenticated = ctx.is_authenticated();
    Json(LoginStatus {
        authenticated,
        redirect: authenticated.then(|| DEFAULT_LOGIN_REDIRECT.to_string()),
    })
}

/// Verifies credentials, sets the token cookies and returns where to go next.
#[instrument(skip(state, ctx, session, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    session: Session,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Response, AppError> {
    let Some((user, issued)) =
        AuthService::login_user(state.users.as_ref(), state.auth.tokens(), &dto).await?
    else {
        let message = state
            .translations
            .translate(ctx.language(), "login.error.invalid_credentials", &[])
            .await;
        return Err(AppError::unauthorized(message));
    };

    let target = match session
        .remove::<String>(SessionKeys::REDIRECT_AFTER_LOGIN)
        .await
    {
        Ok(target) => target,
        Err(e) => {
            warn!(error = %e, "Failed to read redirect target from session");
            None
        }
    };
    if let Err(e) = session.cycle_id().await {
        warn!(error = %e, "Failed to rotate session id after login");
    }

    // Stale records from an earlier login may carry another role.
    state.auth.forget_user(user.id).await;

    let tokens = state.auth.tokens();
    let secure = state.app_config.session.secure;
    let remembered = issued.refresh.is_some();
    let mut jar = CookieJar::new().add(token_cookie(
        tokens.token_name().to_string(),
        issued.access,
        access_cookie_max_age(tokens, remembered),
        secure,
    ));
    if let Some(refresh) = issued.refresh {
        jar = jar.add(token_cookie(
            tokens.refresh_token_name(),
            refresh,
            tokens.refresh_ttl(),
            secure,
        ));
    }

    let body = LoginResponse {
        redirect: AuthService::safe_redirect(target),
    };
    Ok((jar, Json(body)).into_response())
}

/// Clears both token cookies and the cached identity.
#[instrument(skip(state, ctx))]
pub async fn logout_user(State(state): State<AppState>, ctx: RequestContext) -> Response {
    if let Some(user_id) = ctx.user_id() {
        state.auth.forget_user(user_id).await;
    }

    let tokens = state.auth.tokens();
    let secure = state.app_config.session.secure;
    let jar = CookieJar::new()
        .add(removal_cookie(tokens.token_name().to_string(), secure))
        .add(removal_cookie(tokens.refresh_token_name(), secure));

    let message = state
        .translations
        .translate(ctx.language(), "login.logout_success", &[])
        .await;

    (jar, Json(MessageResponse { message })).into_response()
}
