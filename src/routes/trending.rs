use axum::{extract::State, Extension, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{MediaType, SearchCandidate},
    routes::AppState,
};

#[derive(Debug, Serialize)]
pub struct TrendingMoviesResponse {
    pub movies: Vec<Option<SearchCandidate>>,
}

#[derive(Debug, Serialize)]
pub struct TrendingTvResponse {
    pub tvshows: Vec<Option<SearchCandidate>>,
}

/// Today's trending titles matched against the IMDb index, one slot per trending entry
async fn resolve_trending(
    state: &AppState,
    request_id: &RequestId,
    media_type: MediaType,
) -> AppResult<Vec<Option<SearchCandidate>>> {
    let entries = state.trending.trending(media_type).await?;

    tracing::info!(
        request_id = %request_id,
        media_type = %media_type,
        entries = entries.len(),
        "Resolving trending titles"
    );

    state.resolver.resolve_batch(entries).await
}

/// Handler for `GET /movie/trending`
pub async fn movies(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<TrendingMoviesResponse>> {
    let movies = resolve_trending(&state, &request_id, MediaType::Movie).await?;
    Ok(Json(TrendingMoviesResponse { movies }))
}

/// Handler for `GET /tv/trending`
pub async fn tv_shows(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<TrendingTvResponse>> {
    let tvshows = resolve_trending(&state, &request_id, MediaType::Tv).await?;
    Ok(Json(TrendingTvResponse { tvshows }))
}
