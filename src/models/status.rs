use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Which table a watch status lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Movie,
    TvShow,
}

/// Per-user watch status of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchStatus {
    Watched,
    Watching,
    #[default]
    PlanToWatch,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watched => "WATCHED",
            WatchStatus::Watching => "WATCHING",
            WatchStatus::PlanToWatch => "PLAN_TO_WATCH",
        }
    }

    /// Movies can only be watched or planned; `WATCHING` is a tv-only state.
    pub fn validate_for(&self, kind: StatusKind) -> AppResult<()> {
        match (kind, self) {
            (StatusKind::Movie, WatchStatus::Watching) => Err(AppError::InvalidInput(
                "Status WATCHING is not valid for movies".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl FromStr for WatchStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WATCHED" => Ok(WatchStatus::Watched),
            "WATCHING" => Ok(WatchStatus::Watching),
            "PLAN_TO_WATCH" => Ok(WatchStatus::PlanToWatch),
            other => Err(AppError::Internal(format!("Unknown watch status '{}'", other))),
        }
    }
}

/// One stored status row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRecord {
    pub user_id: String,
    pub imdb_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: StatusKind,
    pub status: WatchStatus,
    pub updated_at: DateTime<Utc>,
}

/// Body of `GET /status/{imdbId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "type")]
    pub kind: StatusKind,
    pub status: WatchStatus,
}

impl From<&StatusRecord> for StatusResponse {
    fn from(record: &StatusRecord) -> Self {
        Self {
            kind: record.kind,
            status: record.status,
        }
    }
}

/// Body of `PUT /status/{imdbId}`
#[derive(Debug, Clone, Deserialize)]
pub struct SaveStatusRequest {
    #[serde(rename = "type")]
    pub kind: StatusKind,
    #[serde(default)]
    pub status: WatchStatus,
}
