use crate::models::{QuerySpec, SearchCandidate, TrendingEntry};

use super::{planner::RESULT_COUNT, scoring::score};

/// Picks the highest scoring candidate.
///
/// Ties keep the order the search index returned them in. The winner has its image
/// normalized to the canonical display size. Returns `None` for an empty slice; the
/// caller is expected to try [`fallback_query`] in that case.
pub fn select_best(entry: &TrendingEntry, candidates: &[SearchCandidate]) -> Option<SearchCandidate> {
    let mut ranked: Vec<(i32, &SearchCandidate)> =
        candidates.iter().map(|c| (score(entry, c), c)).collect();
    // stable: equal scores keep index order
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    ranked
        .into_iter()
        .next()
        .map(|(_, best)| best.clone().with_canonical_image())
}

/// Last-resort query with the plain primary name: no year, no colon truncation, no cache key.
pub fn fallback_query(entry: &TrendingEntry) -> QuerySpec {
    QuerySpec {
        query: entry.name.clone(),
        media_type: entry.media_type,
        count: RESULT_COUNT,
        cache_key: None,
    }
}

/// Takes the first hit of the fallback query, unranked.
pub fn select_fallback(results: Vec<SearchCandidate>) -> Option<SearchCandidate> {
    results
        .into_iter()
        .next()
        .map(SearchCandidate::with_canonical_image)
}
