use crate::models::{SearchCandidate, TrendingEntry};

use super::{normalize::normalize, planner::base_names};

const SERIES_BONUS: i32 = 3;
const EXACT_TITLE_BONUS: i32 = 6;
const MAX_MISSING_TOKEN_PENALTY: usize = 2;

/// Scores how well `candidate` matches `entry`. Higher is better; negative totals are legal.
///
/// Terms, summed:
/// - series flag set: +3 (applied to movie lookups too)
/// - normalized title or original title equals a normalized base name: +6
/// - per base name: +present tokens, minus `min(2, missing tokens)`
/// - release year proximity when the entry has a year: 0 → +4, 1 → +2, ≤3 → +1, else −1
pub fn score(entry: &TrendingEntry, candidate: &SearchCandidate) -> i32 {
    let bases: Vec<String> = base_names(entry).iter().map(|b| normalize(b)).collect();
    let title = normalize(&candidate.title);
    let original = candidate.original_title.as_deref().map(normalize);

    let matches_title = |text: &str| title == text || original.as_deref() == Some(text);
    let contains_token =
        |token: &str| title.contains(token) || original.as_deref().is_some_and(|o| o.contains(token));

    let mut total = 0;

    if candidate.is_series {
        total += SERIES_BONUS;
    }

    if bases.iter().any(|base| matches_title(base.as_str())) {
        total += EXACT_TITLE_BONUS;
    }

    for base in &bases {
        let tokens: Vec<&str> = base.split_whitespace().collect();
        let present = tokens.iter().filter(|&&token| contains_token(token)).count();
        let missing = tokens.len() - present;

        total += present as i32;
        if missing > 0 {
            total -= missing.min(MAX_MISSING_TOKEN_PENALTY) as i32;
        }
    }

    if let Some(entry_year) = entry.year() {
        total += year_proximity(entry_year, candidate.year.unwrap_or(0));
    }

    total
}

fn year_proximity(entry_year: i32, candidate_year: i32) -> i32 {
    match (candidate_year - entry_year).abs() {
        0 => 4,
        1 => 2,
        2..=3 => 1,
        _ => -1,
    }
}
