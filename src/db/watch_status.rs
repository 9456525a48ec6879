use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{StatusKind, StatusRecord, WatchStatus},
};

/// Persistence of per-user watch statuses, keyed by (user id, IMDb id)
#[async_trait::async_trait]
pub trait WatchStatusStore: Send + Sync {
    /// Looks the title up in both tables; a movie row wins over a tv row.
    async fn find(&self, user_id: &str, imdb_id: &str) -> AppResult<Option<StatusRecord>>;

    /// Inserts the record or updates the existing row for the same user and title.
    async fn upsert(&self, record: &StatusRecord) -> AppResult<StatusRecord>;
}

#[derive(Debug, sqlx::FromRow)]
struct StatusRow {
    user_id: String,
    imdb_id: String,
    title: String,
    status: String,
    updated_at: DateTime<Utc>,
}

impl StatusRow {
    fn into_record(self, kind: StatusKind) -> AppResult<StatusRecord> {
        Ok(StatusRecord {
            user_id: self.user_id,
            imdb_id: self.imdb_id,
            title: self.title,
            kind,
            status: self.status.parse::<WatchStatus>()?,
            updated_at: self.updated_at,
        })
    }
}

fn table(kind: StatusKind) -> &'static str {
    match kind {
        StatusKind::Movie => "movies",
        StatusKind::TvShow => "tv_shows",
    }
}

/// PostgreSQL implementation over the `movies` and `tv_shows` tables
#[derive(Clone)]
pub struct PgWatchStatusStore {
    pool: PgPool,
}

impl PgWatchStatusStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_in(
        &self,
        kind: StatusKind,
        user_id: &str,
        imdb_id: &str,
    ) -> AppResult<Option<StatusRecord>> {
        let sql = format!(
            "SELECT user_id, imdb_id, title, status, updated_at FROM {} \
             WHERE user_id = $1 AND imdb_id = $2",
            table(kind)
        );

        let row: Option<StatusRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(imdb_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_record(kind)).transpose()
    }
}

#[async_trait::async_trait]
impl WatchStatusStore for PgWatchStatusStore {
    async fn find(&self, user_id: &str, imdb_id: &str) -> AppResult<Option<StatusRecord>> {
        let (movie, tv_show) = tokio::try_join!(
            self.find_in(StatusKind::Movie, user_id, imdb_id),
            self.find_in(StatusKind::TvShow, user_id, imdb_id),
        )?;

        Ok(movie.or(tv_show))
    }

    async fn upsert(&self, record: &StatusRecord) -> AppResult<StatusRecord> {
        record.status.validate_for(record.kind)?;

        let sql = format!(
            "INSERT INTO {} (user_id, imdb_id, title, status, updated_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             ON CONFLICT (user_id, imdb_id) \
             DO UPDATE SET title = EXCLUDED.title, status = EXCLUDED.status, updated_at = NOW() \
             RETURNING user_id, imdb_id, title, status, updated_at",
            table(record.kind)
        );

        let row: StatusRow = sqlx::query_as(&sql)
            .bind(&record.user_id)
            .bind(&record.imdb_id)
            .bind(&record.title)
            .bind(record.status.as_str())
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            user_id = %record.user_id,
            imdb_id = %record.imdb_id,
            status = record.status.as_str(),
            "Watch status saved"
        );

        row.into_record(record.kind)
    }
}
