use serde::{Deserialize, Serialize};

use super::MediaType;

/// Display width every selected image is normalized to
pub const CANONICAL_IMAGE_WIDTH: u32 = 1920;
/// Display height every selected image is normalized to
pub const CANONICAL_IMAGE_HEIGHT: u32 = 1080;

/// Primary image of a search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// One hit returned by the IMDb search index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// IMDb identifier, e.g. `tt0078748`
    pub id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub year: Option<i32>,
    pub is_series: bool,
    pub image: Option<ImageDescriptor>,
}

impl SearchCandidate {
    /// Forces the image dimensions to the canonical 16:9 display size.
    /// The image URL is left untouched.
    pub fn with_canonical_image(mut self) -> Self {
        if let Some(image) = self.image.as_mut() {
            image.width = CANONICAL_IMAGE_WIDTH;
            image.height = CANONICAL_IMAGE_HEIGHT;
        }
        self
    }
}

/// A single call to make against the search index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub query: String,
    pub media_type: MediaType,
    pub count: u32,
    /// `{entryId}_{n}` or `{entryId}_{n}_y`; `None` disables caching for the call
    pub cache_key: Option<String>,
}

/// Full record of a single title, used by the lookup endpoint and when saving a status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDetails {
    pub id: String,
    pub title: String,
    pub original_title: Option<String>,
    pub year: Option<i32>,
    pub is_series: bool,
    pub image: Option<ImageDescriptor>,
    pub plot: Option<String>,
}

// ============================================================================
// IMDb (RapidAPI) Types
// ============================================================================

/// Raw response of `/api/search`
#[derive(Debug, Clone, Deserialize)]
pub struct ImdbSearchResponse {
    #[serde(default)]
    pub data: Option<ImdbSearchData>,
    #[serde(default)]
    pub errors: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImdbSearchData {
    #[serde(default)]
    pub main_search: Option<ImdbMainSearch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImdbMainSearch {
    #[serde(default)]
    pub edges: Option<Vec<ImdbSearchEdge>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImdbSearchEdge {
    pub node: ImdbSearchNode,
}

/// Entities are kept raw: the index may return non-title entities in the same list.
#[derive(Debug, Clone, Deserialize)]
pub struct ImdbSearchNode {
    #[serde(default)]
    pub entity: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImdbText {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImdbYear {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImdbTitleType {
    #[serde(default)]
    pub is_series: bool,
}

/// Title entity as returned by the search and get-base endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImdbTitleEntity {
    pub id: String,
    #[serde(default)]
    pub title_text: Option<ImdbText>,
    #[serde(default)]
    pub original_title_text: Option<ImdbText>,
    #[serde(default)]
    pub release_year: Option<ImdbYear>,
    #[serde(default)]
    pub title_type: Option<ImdbTitleType>,
    #[serde(default)]
    pub primary_image: Option<ImageDescriptor>,
}

impl From<ImdbTitleEntity> for SearchCandidate {
    fn from(entity: ImdbTitleEntity) -> Self {
        SearchCandidate {
            id: entity.id,
            title: entity.title_text.map(|t| t.text).unwrap_or_default(),
            original_title: entity.original_title_text.map(|t| t.text),
            year: entity.release_year.and_then(|y| y.year),
            is_series: entity.title_type.map(|t| t.is_series).unwrap_or(false),
            image: entity.primary_image,
        }
    }
}

/// Envelope shared by `get-base` and `get-overview`
#[derive(Debug, Clone, Deserialize)]
pub struct ImdbTitleResponse<T> {
    pub data: ImdbTitleData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImdbTitleData<T> {
    pub title: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImdbOverview {
    #[serde(default)]
    pub plot: Option<ImdbPlot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImdbPlot {
    #[serde(default)]
    pub plot_text: Option<ImdbPlainText>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImdbPlainText {
    pub plain_text: String,
}

impl TitleDetails {
    /// Merges the base record with the plot taken from the overview endpoint
    pub fn from_parts(base: ImdbTitleEntity, overview: Option<ImdbOverview>) -> Self {
        let plot = overview
            .and_then(|o| o.plot)
            .and_then(|p| p.plot_text)
            .map(|t| t.plain_text);
        let candidate = SearchCandidate::from(base);

        TitleDetails {
            id: candidate.id,
            title: candidate.title,
            original_title: candidate.original_title,
            year: candidate.year,
            is_series: candidate.is_series,
            image: candidate.image,
            plot,
        }
    }
}
