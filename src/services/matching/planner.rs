//! Query planning for one trending entry.
//!
//! The planner is a small state machine: each base name is queried once, and a
//! year-augmented variant is only issued after the plain query came back empty.
//! It performs no I/O; the caller feeds back the hit count of every query it runs.

use crate::models::{MediaType, QuerySpec, TrendingEntry};

/// Most base names that are ever queried for a single entry
pub const MAX_BASE_NAMES: usize = 2;
/// Result count requested from the search index
pub const RESULT_COUNT: u32 = 10;

/// Names used to build search queries and to score candidates.
///
/// Original-language name first, then the primary name; every name containing a
/// colon also contributes its trimmed prefix. Order is preserved, duplicates and
/// blank names are dropped. Not capped; see [`MAX_BASE_NAMES`] for the query bound.
pub fn base_names(entry: &TrendingEntry) -> Vec<String> {
    let mut names: Vec<&str> = Vec::new();
    for name in [entry.original_name.as_deref(), Some(entry.name.as_str())]
        .into_iter()
        .flatten()
    {
        let name = name.trim();
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }

    let mut bases: Vec<String> = Vec::new();
    for name in names {
        let mut variants = vec![name];
        if let Some((prefix, _)) = name.split_once(':') {
            variants.push(prefix.trim());
        }
        for variant in variants {
            if !variant.is_empty() && !bases.iter().any(|b| b == variant) {
                bases.push(variant.to_string());
            }
        }
    }

    bases
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    /// Nothing issued yet
    Planned,
    /// Plain query for base name `n` is in flight
    AwaitingBase(usize),
    /// Year variant for base name `n` is in flight
    AwaitingYearVariant(usize),
    Done,
}

/// Incremental query planner for a single [`TrendingEntry`]
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    entry_id: u64,
    media_type: MediaType,
    year: Option<i32>,
    names: Vec<String>,
    state: PlanState,
}

impl QueryPlanner {
    pub fn new(entry: &TrendingEntry) -> Self {
        let mut names = base_names(entry);
        names.truncate(MAX_BASE_NAMES);

        Self {
            entry_id: entry.id,
            media_type: entry.media_type,
            year: entry.year(),
            names,
            state: PlanState::Planned,
        }
    }

    pub fn state(&self) -> PlanState {
        self.state
    }

    /// Base names this planner will query, in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the first query. Only yields once; later calls return `None`.
    pub fn start(&mut self) -> Option<QuerySpec> {
        if self.state != PlanState::Planned {
            return None;
        }
        self.base_query(0)
    }

    /// Feeds back the hit count of the query last returned and yields the next one.
    pub fn observe(&mut self, hits: usize) -> Option<QuerySpec> {
        match self.state {
            PlanState::AwaitingBase(index) => match self.year {
                Some(year) if hits == 0 => {
                    self.state = PlanState::AwaitingYearVariant(index);
                    Some(self.spec(
                        format!("{} {}", self.names[index], year),
                        format!("{}_{}_y", self.entry_id, index + 1),
                    ))
                }
                _ => self.base_query(index + 1),
            },
            PlanState::AwaitingYearVariant(index) => self.base_query(index + 1),
            PlanState::Planned | PlanState::Done => None,
        }
    }

    fn base_query(&mut self, index: usize) -> Option<QuerySpec> {
        match self.names.get(index) {
            Some(name) => {
                let spec = self.spec(name.clone(), format!("{}_{}", self.entry_id, index + 1));
                self.state = PlanState::AwaitingBase(index);
                Some(spec)
            }
            None => {
                self.state = PlanState::Done;
                None
            }
        }
    }

    fn spec(&self, query: String, cache_key: String) -> QuerySpec {
        QuerySpec {
            query,
            media_type: self.media_type,
            count: RESULT_COUNT,
            cache_key: Some(cache_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, original: Option<&str>, date: Option<&str>) -> TrendingEntry {
        TrendingEntry {
            id: 42,
            name: name.to_string(),
            original_name: original.map(str::to_string),
            date: date.map(str::to_string),
            media_type: MediaType::Tv,
        }
    }

    /// Drives the planner answering every query with the given hit count
    fn drain(planner: &mut QueryPlanner, hits: usize) -> Vec<QuerySpec> {
        let mut specs = Vec::new();
        let mut next = planner.start();
        while let Some(spec) = next {
            specs.push(spec);
            next = planner.observe(hits);
        }
        specs
    }

    #[test]
    fn test_base_names_original_first_and_deduplicated() {
        let names = base_names(&entry("Alien", Some("Alien"), None));
        assert_eq!(names, vec!["Alien"]);

        let names = base_names(&entry("Angels of Death", Some("殺戮の天使"), None));
        assert_eq!(names, vec!["殺戮の天使", "Angels of Death"]);
    }

    #[test]
    fn test_base_names_colon_prefix() {
        let names = base_names(&entry(
            "Spider-Man: Across the Spider-Verse",
            Some("Spider-Man: Across the Spider-Verse"),
            None,
        ));
        assert_eq!(names, vec!["Spider-Man: Across the Spider-Verse", "Spider-Man"]);
    }

    #[test]
    fn test_base_names_skip_blank() {
        let names = base_names(&entry("Dune", Some("  "), None));
        assert_eq!(names, vec!["Dune"]);

        let names = base_names(&entry(": Subtitle only", None, None));
        assert_eq!(names, vec![": Subtitle only"]);
    }

    #[test]
    fn test_plan_with_results_issues_only_base_queries() {
        let mut planner = QueryPlanner::new(&entry("Angels of Death", Some("殺戮の天使"), Some("2018-07-06")));
        let specs = drain(&mut planner, 3);

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].query, "殺戮の天使");
        assert_eq!(specs[0].cache_key.as_deref(), Some("42_1"));
        assert_eq!(specs[1].query, "Angels of Death");
        assert_eq!(specs[1].cache_key.as_deref(), Some("42_2"));
        assert!(specs.iter().all(|s| s.count == RESULT_COUNT && s.media_type == MediaType::Tv));
        assert_eq!(planner.state(), PlanState::Done);
    }

    #[test]
    fn test_year_variant_follows_empty_base_query() {
        let mut planner = QueryPlanner::new(&entry("Angels of Death", Some("殺戮の天使"), Some("2018-07-06")));

        let first = planner.start().unwrap();
        assert_eq!(first.query, "殺戮の天使");
        assert_eq!(planner.state(), PlanState::AwaitingBase(0));

        let year_variant = planner.observe(0).unwrap();
        assert_eq!(year_variant.query, "殺戮の天使 2018");
        assert_eq!(year_variant.cache_key.as_deref(), Some("42_1_y"));
        assert_eq!(planner.state(), PlanState::AwaitingYearVariant(0));

        let second = planner.observe(0).unwrap();
        assert_eq!(second.query, "Angels of Death");
        assert_eq!(planner.state(), PlanState::AwaitingBase(1));

        assert!(planner.observe(5).is_none());
        assert_eq!(planner.state(), PlanState::Done);
    }

    #[test]
    fn test_no_year_variant_without_year() {
        let mut planner = QueryPlanner::new(&entry("Dune", None, None));
        let specs = drain(&mut planner, 0);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].query, "Dune");
    }

    #[test]
    fn test_never_more_than_four_queries() {
        let mut planner = QueryPlanner::new(&entry(
            "Spider-Man: Across the Spider-Verse",
            Some("Spider-Man: Un nouvel univers"),
            Some("2023-05-31"),
        ));
        let specs = drain(&mut planner, 0);

        assert_eq!(specs.len(), 4);
        assert!(planner.names().len() <= MAX_BASE_NAMES);
        assert_eq!(specs[0].query, "Spider-Man: Un nouvel univers");
        assert_eq!(specs[1].query, "Spider-Man: Un nouvel univers 2023");
        assert_eq!(specs[2].query, "Spider-Man");
        assert_eq!(specs[3].query, "Spider-Man 2023");
    }

    #[test]
    fn test_query_names_capped_but_base_names_not() {
        let e = entry("Nothing: At All", Some("Rien"), None);

        assert_eq!(base_names(&e), vec!["Rien", "Nothing: At All", "Nothing"]);
        assert_eq!(QueryPlanner::new(&e).names(), ["Rien", "Nothing: At All"]);
    }

    #[test]
    fn test_start_only_once() {
        let mut planner = QueryPlanner::new(&entry("Dune", None, None));
        assert!(planner.start().is_some());
        assert!(planner.start().is_none());
    }

    #[test]
    fn test_observe_before_start_is_ignored() {
        let mut planner = QueryPlanner::new(&entry("Dune", None, Some("2021-09-15")));
        assert!(planner.observe(0).is_none());
        assert_eq!(planner.state(), PlanState::Planned);
    }
}
