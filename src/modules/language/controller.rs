use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, Uri, header},
    response::Redirect,
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::context::RequestContext;
use crate::middleware::language::language_url;
use crate::session::SessionKeys;
use crate::state::AppState;

#[derive(Serialize, Debug)]
pub struct LanguagesResponse {
    pub languages: Vec<String>,
    pub current: String,
    pub default: String,
}

/// Path and query of the `Referer` header, ignoring its origin.
fn referer_target(headers: &HeaderMap) -> (String, Option<String>) {
    let uri = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Uri>().ok());

    match uri {
        Some(uri) => (
            uri.path().to_string(),
            uri.query().filter(|q| !q.is_empty()).map(str::to_string),
        ),
        None => ("/".to_string(), None),
    }
}

/// Stores the chosen language and sends the visitor back to the page they
/// came from, rewritten for that language.
#[instrument(skip(state, session, headers))]
pub async fn switch_language(
    State(state): State<AppState>,
    Path(code): Path<String>,
    session: Session,
    headers: HeaderMap,
) -> Redirect {
    let available = state.languages.available_languages().await;
    let requested = code.trim().to_ascii_lowercase();
    let language = if state.languages.is_supported(&requested, &available) {
        requested
    } else {
        info!(requested = %code, "Unsupported language requested, using default");
        state.languages.default_language(&available)
    };

    if let Err(e) = session.insert(SessionKeys::LANGUAGE, &language).await {
        warn!(error = %e, "Failed to store language in session");
    }

    let (path, query) = referer_target(&headers);
    let mut target = language_url(&path, &language, &available);
    if let Some(query) = query {
        target.push('?');
        target.push_str(&query);
    }

    Redirect::to(&target)
}

/// Supported languages with the current and default ones.
#[instrument(skip(state, ctx))]
pub async fn list_languages(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Json<LanguagesResponse> {
    let languages = state.languages.available_languages().await;
    let default = state.languages.default_language(&languages);

    Json(LanguagesResponse {
        current: ctx.language().to_string(),
        default,
        languages,
    })
}
