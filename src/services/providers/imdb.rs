/// IMDb provider (via RapidAPI)
///
/// Provides the free-text search index used for matching and the single-title
/// lookup used by the detail and status endpoints.
///
/// API Flow:
/// 1. Search: /api/search?q=&type=&count= → title entities with IMDb ids
/// 2. Title: /api/title/get-base?tt= and /api/title/get-overview?tt=, fetched concurrently
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        ImdbOverview, ImdbSearchResponse, ImdbTitleEntity, ImdbTitleResponse, QuerySpec,
        SearchCandidate, TitleDetails,
    },
    services::providers::{SearchIndex, TitleLookup},
};
use reqwest::{Client as HttpClient, StatusCode};

const DETAILS_CACHE_TTL: u64 = 604800; // 1 week

#[derive(Clone)]
pub struct ImdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_host: String,
    api_url: String,
    cache: Cache,
}

impl ImdbProvider {
    pub fn new(cache: Cache, api_key: String, api_host: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_host,
            api_url,
            cache,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), path)
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> AppResult<String> {
        let response = self
            .http_client
            .get(self.endpoint(path))
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(path = %path, "IMDb API rate limit exceeded");
            return Err(AppError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(path = %path, status = %status, body = %body, "IMDb API request failed");
            return Err(AppError::ExternalApi(format!(
                "IMDb API returned status {}",
                status
            )));
        }

        Ok(response.text().await?)
    }

    /// Extracts title candidates from a search response body.
    ///
    /// Reported API errors and a missing `mainSearch.edges` are format errors.
    /// Null entities and entities that are not titles are skipped.
    fn parse_search(body: &str) -> AppResult<Vec<SearchCandidate>> {
        let response: ImdbSearchResponse = serde_json::from_str(body).map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse IMDb search response: {}", e))
        })?;

        if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
            return Err(AppError::ExternalApi(format!(
                "IMDb search reported {} error(s): {}",
                errors.len(),
                serde_json::Value::Array(errors)
            )));
        }

        let edges = response
            .data
            .and_then(|d| d.main_search)
            .and_then(|m| m.edges)
            .ok_or_else(|| AppError::ExternalApi("Invalid IMDb search response format".to_string()))?;

        let candidates = edges
            .into_iter()
            .filter_map(|edge| edge.node.entity)
            .filter_map(|entity| serde_json::from_value::<ImdbTitleEntity>(entity).ok())
            .map(SearchCandidate::from)
            .collect();

        Ok(candidates)
    }

    fn parse_title<T: serde::de::DeserializeOwned>(body: &str, imdb_id: &str) -> AppResult<Option<T>> {
        let response: ImdbTitleResponse<T> = serde_json::from_str(body).map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse IMDb title {}: {}", imdb_id, e))
        })?;
        Ok(response.data.title)
    }
}

#[async_trait::async_trait]
impl SearchIndex for ImdbProvider {
    async fn search(&self, spec: &QuerySpec) -> AppResult<Vec<SearchCandidate>> {
        let count = spec.count.to_string();
        let body = self
            .get(
                "/api/search",
                &[
                    ("count", count.as_str()),
                    ("type", spec.media_type.as_str()),
                    ("q", spec.query.as_str()),
                ],
            )
            .await?;

        let candidates = Self::parse_search(&body)?;

        tracing::info!(
            query = %spec.query,
            media_type = %spec.media_type,
            results = candidates.len(),
            provider = "imdb",
            "Title search completed"
        );

        Ok(candidates)
    }

    fn name(&self) -> &'static str {
        "imdb"
    }
}

#[async_trait::async_trait]
impl TitleLookup for ImdbProvider {
    async fn title_details(&self, imdb_id: &str) -> AppResult<TitleDetails> {
        if imdb_id.trim().is_empty() {
            return Err(AppError::InvalidInput("IMDb id cannot be empty".to_string()));
        }

        cached!(
            self.cache,
            CacheKey::TitleDetails(imdb_id.to_string()),
            DETAILS_CACHE_TTL,
            async move {
                let params = [("tt", imdb_id)];
                let (base_body, overview_body) = tokio::try_join!(
                    self.get("/api/title/get-base", &params),
                    self.get("/api/title/get-overview", &params),
                )?;

                let base: ImdbTitleEntity = Self::parse_title(&base_body, imdb_id)?
                    .ok_or_else(|| AppError::NotFound(format!("Title {} not found", imdb_id)))?;
                let overview: Option<ImdbOverview> = Self::parse_title(&overview_body, imdb_id)?;

                tracing::info!(imdb_id = %imdb_id, provider = "imdb", "Title details fetched");

                Ok::<_, AppError>(TitleDetails::from_parts(base, overview))
            }
        )
    }
}
