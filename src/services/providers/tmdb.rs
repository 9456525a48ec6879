/// TMDB trending-list provider
///
/// `GET /trending/{movie|tv}/day`, cached for a day under one key per media type.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{MediaType, TmdbMovieTrending, TmdbTrendingResponse, TmdbTvTrending, TrendingEntry},
    services::providers::TrendingProvider,
};
use reqwest::Client as HttpClient;

const TRENDING_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    fn trending_url(&self, media_type: MediaType) -> String {
        let segment = match media_type {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        };
        format!("{}/trending/{}/day", self.api_url.trim_end_matches('/'), segment)
    }

    fn parse_trending(media_type: MediaType, body: &str) -> AppResult<Vec<TrendingEntry>> {
        let parse_error =
            |e: serde_json::Error| AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e));

        let entries = match media_type {
            MediaType::Movie => serde_json::from_str::<TmdbTrendingResponse<TmdbMovieTrending>>(body)
                .map_err(parse_error)?
                .results
                .into_iter()
                .map(TrendingEntry::from)
                .collect(),
            MediaType::Tv => serde_json::from_str::<TmdbTrendingResponse<TmdbTvTrending>>(body)
                .map_err(parse_error)?
                .results
                .into_iter()
                .map(TrendingEntry::from)
                .collect(),
        };

        Ok(entries)
    }
}

#[async_trait::async_trait]
impl TrendingProvider for TmdbProvider {
    async fn trending(&self, media_type: MediaType) -> AppResult<Vec<TrendingEntry>> {
        cached!(
            self.cache,
            CacheKey::Trending(media_type),
            TRENDING_CACHE_TTL,
            async move {
                let response = self
                    .http_client
                    .get(self.trending_url(media_type))
                    .query(&[("api_key", self.api_key.as_str())])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    tracing::error!(status = %status, body = %body, "TMDB trending request failed");
                    return Err(AppError::ExternalApi(format!(
                        "TMDB API returned status {}",
                        status
                    )));
                }

                let body = response.text().await?;
                let entries = Self::parse_trending(media_type, &body)?;

                tracing::info!(
                    media_type = %media_type,
                    results = entries.len(),
                    provider = "tmdb",
                    "Trending list fetched"
                );

                Ok(entries)
            }
        )
    }
}
