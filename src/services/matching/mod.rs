//! Candidate resolution and ranking.
//!
//! Reconciles a trending entry (TMDB, numeric ids) with hits from the IMDb search
//! index, which share no key. Everything in here is synchronous and free of I/O;
//! [`crate::services::resolver`] drives it against the live index.

pub mod backfill;
pub mod normalize;
pub mod planner;
pub mod scoring;
pub mod selector;

pub use backfill::backfill;
pub use normalize::normalize;
pub use planner::{base_names, PlanState, QueryPlanner};
pub use scoring::score;
pub use selector::{fallback_query, select_best, select_fallback};
