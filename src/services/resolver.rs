use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::{
    error::AppResult,
    models::{QuerySpec, SearchCandidate, TrendingEntry},
    services::{
        matching::{backfill, fallback_query, select_best, select_fallback, QueryPlanner},
        providers::SearchIndex,
    },
};

/// Resolves trending entries to IMDb search candidates.
///
/// One entry runs the query planner to completion, ranks the deduplicated hits and
/// falls back to a plain-name query when nothing was found. A batch resolves every
/// entry in its own task; only a rate limit aborts the batch.
#[derive(Clone)]
pub struct TitleResolver {
    index: Arc<dyn SearchIndex>,
    call_timeout: Duration,
}

impl TitleResolver {
    pub fn new(index: Arc<dyn SearchIndex>, call_timeout: Duration) -> Self {
        Self {
            index,
            call_timeout,
        }
    }

    /// Best match for one entry, `Ok(None)` when no query produced a hit.
    ///
    /// Errors are returned as-is; see [`Self::resolve_isolated`] for the batch policy.
    pub async fn resolve(&self, entry: &TrendingEntry) -> AppResult<Option<SearchCandidate>> {
        let mut planner = QueryPlanner::new(entry);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        let mut next = planner.start();
        while let Some(spec) = next {
            let hits = self.run_query(&spec).await?;
            let hit_count = hits.len();

            for hit in hits {
                if seen.insert(hit.id.clone()) {
                    candidates.push(hit);
                }
            }

            next = planner.observe(hit_count);
        }

        if let Some(best) = select_best(entry, &candidates) {
            return Ok(Some(best));
        }

        let spec = fallback_query(entry);
        tracing::debug!(entry_id = entry.id, query = %spec.query, "No candidates, trying fallback query");
        let fallback = select_fallback(self.run_query(&spec).await?);
        if fallback.is_none() {
            tracing::info!(entry_id = entry.id, name = %entry.name, "No match found");
        }

        Ok(fallback)
    }

    /// Like [`Self::resolve`], but transport and format errors degrade to `None`.
    /// Only [`crate::error::AppError::RateLimited`] is returned as an error.
    pub async fn resolve_isolated(&self, entry: &TrendingEntry) -> AppResult<Option<SearchCandidate>> {
        match self.resolve(entry).await {
            Ok(result) => Ok(result),
            Err(e) if e.is_rate_limited() => Err(e),
            Err(e) => {
                tracing::warn!(
                    entry_id = entry.id,
                    name = %entry.name,
                    error = %e,
                    "Resolution failed, entry left unresolved"
                );
                Ok(None)
            }
        }
    }

    /// Resolves all entries concurrently, one result per entry in input order.
    ///
    /// The first rate limit aborts the remaining tasks and is returned.
    pub async fn resolve_all(
        &self,
        entries: Vec<TrendingEntry>,
    ) -> AppResult<Vec<Option<SearchCandidate>>> {
        let mut tasks = JoinSet::new();
        let total = entries.len();

        for (position, entry) in entries.into_iter().enumerate() {
            let resolver = self.clone();
            tasks.spawn(async move { (position, resolver.resolve_isolated(&entry).await) });
        }

        let mut results: Vec<Option<SearchCandidate>> = vec![None; total];

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, Ok(result))) => results[position] = result,
                Ok((_, Err(e))) => {
                    tracing::warn!(error = %e, "Aborting resolution batch");
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Resolution task join error");
                }
            }
        }

        Ok(results)
    }

    /// Resolves and backfills a batch, keeping one slot per input entry.
    pub async fn resolve_batch(
        &self,
        entries: Vec<TrendingEntry>,
    ) -> AppResult<Vec<Option<SearchCandidate>>> {
        let total = entries.len();
        let results = self.resolve_all(entries).await?;
        let resolved = results.iter().filter(|r| r.is_some()).count();

        tracing::info!(
            entries = total,
            resolved,
            backfilled = if resolved > 0 { total - resolved } else { 0 },
            provider = self.index.name(),
            "Resolution batch completed"
        );

        Ok(backfill(results))
    }

    /// One search call; a timeout counts as zero hits.
    async fn run_query(&self, spec: &QuerySpec) -> AppResult<Vec<SearchCandidate>> {
        match tokio::time::timeout(self.call_timeout, self.index.search(spec)).await {
            Ok(result) => {
                let hits = result?;
                tracing::debug!(
                    query = %spec.query,
                    cache_key = ?spec.cache_key,
                    hits = hits.len(),
                    "Search query completed"
                );
                Ok(hits)
            }
            Err(_) => {
                tracing::warn!(
                    query = %spec.query,
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Search query timed out"
                );
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{ImageDescriptor, MediaType};
    use crate::services::providers::MockSearchIndex;
    use mockall::predicate::function;
    use tokio_test::{assert_err, assert_ok};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn entry(id: u64, name: &str, original: Option<&str>, date: Option<&str>) -> TrendingEntry {
        TrendingEntry {
            id,
            name: name.to_string(),
            original_name: original.map(str::to_string),
            date: date.map(str::to_string),
            media_type: MediaType::Movie,
        }
    }

    fn candidate(id: &str, title: &str, year: Option<i32>) -> SearchCandidate {
        SearchCandidate {
            id: id.to_string(),
            title: title.to_string(),
            original_title: None,
            year,
            is_series: false,
            image: Some(ImageDescriptor {
                url: format!("https://img/{}.jpg", id),
                width: 500,
                height: 750,
            }),
        }
    }

    fn resolver(index: MockSearchIndex) -> TitleResolver {
        TitleResolver::new(Arc::new(index), TIMEOUT)
    }

    #[tokio::test]
    async fn test_exact_match_selected() {
        let mut index = MockSearchIndex::new();
        index
            .expect_search()
            .with(function(|s: &QuerySpec| s.query == "Alien"))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    candidate("tt1", "Alien", Some(1979)),
                    candidate("tt2", "Alien 3", Some(1992)),
                ])
            });

        let best = resolver(index)
            .resolve(&entry(1, "Alien", None, Some("1979-05-25")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(best.id, "tt1");
        assert_eq!(best.image.unwrap().width, 1920);
    }

    #[tokio::test]
    async fn test_duplicate_ids_across_queries_deduplicated() {
        let mut index = MockSearchIndex::new();
        // tt2 comes back from both base-name queries and must only be ranked once
        index.expect_search().times(2).returning(|spec| {
            if spec.query == "Alien" {
                Ok(vec![candidate("tt2", "Alien 3", Some(1992))])
            } else {
                Ok(vec![
                    candidate("tt2", "Alien 3", Some(1992)),
                    candidate("tt1", "Alien", Some(1979)),
                ])
            }
        });

        let best = resolver(index)
            .resolve(&entry(1, "Alien", Some("Alien: Original"), Some("1979-05-25")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(best.id, "tt1");
    }

    #[tokio::test]
    async fn test_year_variant_issued_after_empty_base_query() {
        let mut index = MockSearchIndex::new();
        let mut seq = mockall::Sequence::new();
        index
            .expect_search()
            .with(function(|s: &QuerySpec| {
                s.query == "Heat" && s.cache_key.as_deref() == Some("9_1")
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));
        index
            .expect_search()
            .with(function(|s: &QuerySpec| {
                s.query == "Heat 1995" && s.cache_key.as_deref() == Some("9_1_y")
            }))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![candidate("tt0113277", "Heat", Some(1995))]));

        let best = resolver(index)
            .resolve(&entry(9, "Heat", None, Some("1995-12-15")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(best.id, "tt0113277");
    }

    #[tokio::test]
    async fn test_no_match_anywhere_returns_none() {
        let mut index = MockSearchIndex::new();
        // two base names, each with a year variant, then the fallback
        index.expect_search().times(5).returning(|_| Ok(Vec::new()));

        let result = resolver(index)
            .resolve(&entry(3, "Nothing: At All", Some("Rien"), Some("2020-01-01")))
            .await
            .unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_fallback_first_result_used() {
        let mut index = MockSearchIndex::new();
        index
            .expect_search()
            .with(function(|s: &QuerySpec| s.cache_key.is_some()))
            .returning(|_| Ok(Vec::new()));
        index
            .expect_search()
            .with(function(|s: &QuerySpec| s.cache_key.is_none() && s.query == "Dune"))
            .times(1)
            .returning(|_| Ok(vec![candidate("tt1160419", "Dune: Part One", Some(2021))]));

        let best = resolver(index)
            .resolve(&entry(5, "Dune", None, None))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(best.id, "tt1160419");
        assert_eq!(best.image.unwrap().height, 1080);
    }

    #[tokio::test]
    async fn test_transport_error_degrades_to_none() {
        let mut index = MockSearchIndex::new();
        index
            .expect_search()
            .returning(|_| Err(AppError::ExternalApi("connection reset".to_string())));

        let r = resolver(index);
        let e = entry(1, "Alien", None, None);

        assert_err!(r.resolve(&e).await);
        assert_eq!(assert_ok!(r.resolve_isolated(&e).await), None);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_swallowed() {
        let mut index = MockSearchIndex::new();
        index.expect_search().returning(|_| Err(AppError::RateLimited));

        let result = resolver(index).resolve_isolated(&entry(1, "Alien", None, None)).await;
        assert!(matches!(result, Err(AppError::RateLimited)));
    }

    struct SlowIndex;

    #[async_trait::async_trait]
    impl SearchIndex for SlowIndex {
        async fn search(&self, spec: &QuerySpec) -> AppResult<Vec<SearchCandidate>> {
            if spec.cache_key.is_some() {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(vec![candidate("tt7", "Slow", None)])
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_timeout_counts_as_empty_and_reaches_fallback() {
        let r = TitleResolver::new(Arc::new(SlowIndex), Duration::from_millis(20));

        let best = r.resolve(&entry(1, "Slow", None, None)).await.unwrap().unwrap();
        assert_eq!(best.id, "tt7");
    }

    #[tokio::test]
    async fn test_batch_isolates_failures_and_backfills() {
        let mut index = MockSearchIndex::new();
        index.expect_search().returning(|spec| match spec.query.as_str() {
            "Alien" => Ok(vec![candidate("tt1", "Alien", None)]),
            "Broken" => Err(AppError::ExternalApi("bad gateway".to_string())),
            "Heat" => Ok(vec![candidate("tt3", "Heat", None)]),
            _ => Ok(Vec::new()),
        });
        index.expect_name().return_const("mock");

        let entries = vec![
            entry(1, "Alien", None, None),
            entry(2, "Broken", None, None),
            entry(3, "Heat", None, None),
        ];

        let r = resolver(index);
        let raw = r.resolve_all(entries.clone()).await.unwrap();
        assert_eq!(raw.iter().map(|c| c.as_ref().map(|c| c.id.as_str())).collect::<Vec<_>>(), vec![
            Some("tt1"),
            None,
            Some("tt3")
        ]);

        let filled = r.resolve_batch(entries).await.unwrap();
        let ids: Vec<&str> = filled.iter().map(|c| c.as_ref().unwrap().id.as_str()).collect();
        assert_eq!(ids, vec!["tt1", "tt1", "tt3"]);
    }

    #[tokio::test]
    async fn test_batch_aborts_on_rate_limit() {
        let mut index = MockSearchIndex::new();
        index.expect_search().returning(|spec| match spec.query.as_str() {
            "Limited" => Err(AppError::RateLimited),
            _ => Ok(vec![candidate("tt1", "Alien", None)]),
        });
        index.expect_name().return_const("mock");

        let entries = vec![
            entry(1, "Alien", None, None),
            entry(2, "Limited", None, None),
            entry(3, "Alien", None, None),
        ];

        let result = resolver(index).resolve_batch(entries).await;
        assert!(matches!(result, Err(AppError::RateLimited)));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let mut index = MockSearchIndex::new();
        index.expect_name().return_const("mock");

        let result = resolver(index).resolve_batch(Vec::new()).await.unwrap();
        assert!(result.is_empty());
    }
}
