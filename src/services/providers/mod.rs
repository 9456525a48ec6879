//! External data providers.
//!
//! TMDB supplies the trending lists (numeric ids), the IMDb index on RapidAPI
//! supplies search hits and title records (IMDb ids). The traits below are the
//! seams the resolver and the HTTP layer depend on.
use crate::{
    error::AppResult,
    models::{MediaType, QuerySpec, SearchCandidate, TitleDetails, TrendingEntry},
};

pub mod cached_search;
pub mod imdb;
pub mod tmdb;

pub use cached_search::CachedSearchIndex;
pub use imdb::ImdbProvider;
pub use tmdb::TmdbProvider;

/// Source of today's trending titles
#[async_trait::async_trait]
pub trait TrendingProvider: Send + Sync {
    /// Ordered trending entries for `media_type`.
    ///
    /// Transport failures are errors; an empty list is a legitimate answer.
    async fn trending(&self, media_type: MediaType) -> AppResult<Vec<TrendingEntry>>;
}

/// Free-text search index
///
/// Implementations must return [`crate::error::AppError::RateLimited`] when the index
/// signals quota exhaustion so callers can stop issuing further queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(&self, spec: &QuerySpec) -> AppResult<Vec<SearchCandidate>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Lookup of a single title by IMDb id
#[async_trait::async_trait]
pub trait TitleLookup: Send + Sync {
    async fn title_details(&self, imdb_id: &str) -> AppResult<TitleDetails>;
}
