use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use folio_core::AppError;

use crate::context::RequestContext;
use crate::state::AppState;

#[derive(Serialize, Debug)]
pub struct PageResponse {
    pub title: String,
    #[serde(flatten)]
    pub context: RequestContext,
}

async fn page(state: &AppState, ctx: RequestContext, title_key: &str) -> PageResponse {
    let title = state
        .translations
        .translate(ctx.language(), title_key, &[])
        .await;
    PageResponse {
        title,
        context: ctx,
    }
}

#[instrument(skip(state, ctx))]
pub async fn home(State(state): State<AppState>, ctx: RequestContext) -> Json<PageResponse> {
    Json(page(&state, ctx, "nav.home").await)
}

/// `/{lang}`: the home page under a language prefix. Unsupported codes 404.
#[instrument(skip(state, ctx))]
pub async fn localized_home(
    State(state): State<AppState>,
    Path(lang): Path<String>,
    ctx: RequestContext,
) -> Result<Json<PageResponse>, AppError> {
    let available = state.languages.available_languages().await;
    if !state.languages.is_supported(&lang, &available) {
        return Err(AppError::not_found(anyhow!("Page not found")));
    }

    Ok(Json(page(&state, ctx, "nav.home").await))
}

#[instrument(skip(state, ctx))]
pub async fn forbidden(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> (StatusCode, Json<Value>) {
    let message = state
        .translations
        .translate(ctx.language(), "errors.forbidden", &[])
        .await;
    (StatusCode::FORBIDDEN, Json(json!({ "error": message })))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
