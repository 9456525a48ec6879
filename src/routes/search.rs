use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{error::AppResult, models::TitleDetails, routes::AppState};

/// Handler for `GET /search/imdb/{imdb_id}`
pub async fn title_details(
    State(state): State<Arc<AppState>>,
    Path(imdb_id): Path<String>,
) -> AppResult<Json<TitleDetails>> {
    tracing::debug!(imdb_id = %imdb_id, "Looking up title");
    let details = state.titles.title_details(&imdb_id).await?;
    Ok(Json(details))
}
