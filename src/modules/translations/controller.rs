use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::context::RequestContext;
use crate::state::AppState;

use super::service::Catalogue;

#[derive(Serialize, Debug)]
pub struct TranslationsResponse {
    pub language: String,
    pub translations: Catalogue,
}

/// Catalogue for the language resolved for this request.
#[instrument(skip(state, ctx), fields(language = %ctx.language()))]
pub async fn get_translations(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Json<TranslationsResponse> {
    let language = ctx.language().to_string();
    let translations = state.translations.all(&language).await;

    Json(TranslationsResponse {
        language,
        translations,
    })
}
