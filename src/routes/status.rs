use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    models::{SaveStatusRequest, StatusRecord, StatusResponse},
    routes::AppState,
};

/// Handler for `GET /status/{imdb_id}`; `null` when the user has no status for the title
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<Option<StatusResponse>>> {
    let record = state.statuses.find(&user_id, &imdb_id).await?;
    Ok(Json(record.as_ref().map(StatusResponse::from)))
}

/// Handler for `PUT /status/{imdb_id}`
///
/// Resolves the display title through the lookup provider, then upserts.
pub async fn save_status(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(imdb_id): Path<String>,
    Json(request): Json<SaveStatusRequest>,
) -> AppResult<Json<StatusRecord>> {
    request.status.validate_for(request.kind)?;

    let details = state.titles.title_details(&imdb_id).await?;

    let record = StatusRecord {
        user_id,
        imdb_id,
        title: details.title,
        kind: request.kind,
        status: request.status,
        updated_at: Utc::now(),
    };

    let saved = state.statuses.upsert(&record).await?;
    Ok(Json(saved))
}
