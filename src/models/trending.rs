use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Media-type hint shared by the trending lists and the search index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Wire value used by the search index `type` parameter and cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "MOVIE",
            MediaType::Tv => "TV",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One title appearing in today's trending list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub id: u64,
    pub name: String,
    pub original_name: Option<String>,
    /// First release or first air date, e.g. `2018-07-06`
    pub date: Option<String>,
    pub media_type: MediaType,
}

impl TrendingEntry {
    /// Release year taken from the first four characters of the date.
    pub fn year(&self) -> Option<i32> {
        self.date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

// ============================================================================
// TMDB Trending API Types
// ============================================================================

/// Response envelope of `/trending/{movie|tv}/day`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTrendingResponse<T> {
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieTrending {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTvTrending {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

impl From<TmdbMovieTrending> for TrendingEntry {
    fn from(movie: TmdbMovieTrending) -> Self {
        TrendingEntry {
            id: movie.id,
            name: movie.title,
            original_name: movie.original_title,
            date: movie.release_date.filter(|d| !d.is_empty()),
            media_type: MediaType::Movie,
        }
    }
}

impl From<TmdbTvTrending> for TrendingEntry {
    fn from(show: TmdbTvTrending) -> Self {
        TrendingEntry {
            id: show.id,
            name: show.name,
            original_name: show.original_name,
            date: show.first_air_date.filter(|d| !d.is_empty()),
            media_type: MediaType::Tv,
        }
    }
}
