use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::WatchStatusStore,
    middleware::{
        auth::auth_middleware,
        request_id::{make_span_with_request_id, request_id_middleware},
    },
    services::{
        identity::IdentityVerifier,
        providers::{TitleLookup, TrendingProvider},
        resolver::TitleResolver,
    },
};

pub mod search;
pub mod status;
pub mod trending;

/// Shared collaborators for all handlers
pub struct AppState {
    pub trending: Arc<dyn TrendingProvider>,
    pub resolver: TitleResolver,
    pub titles: Arc<dyn TitleLookup>,
    pub statuses: Arc<dyn WatchStatusStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(state.clone()))
        .layer(
            // outermost first: the request id must exist before the trace span is made
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let authenticated = Router::new()
        .route(
            "/status/:imdb_id",
            get(status::get_status).put(status::save_status),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/movie/trending", get(trending::movies))
        .route("/tv/trending", get(trending::tv_shows))
        .route("/search/imdb/:imdb_id", get(search::title_details))
        .merge(authenticated)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
