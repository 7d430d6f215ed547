//! PostgreSQL implementation of the URL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{InsertOutcome, UrlStore};
use crate::error::StoreError;

type UrlRow = (String, String, DateTime<Utc>, Option<DateTime<Utc>>);

/// Row counts reported by [`PgUrlStore::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlStats {
    pub total: i64,
    pub expired: i64,
}

/// PostgreSQL store for the `urls` table.
///
/// Uniqueness of both `short_code` (primary key) and `long_url` is enforced by
/// the schema; see `migrations/`.
#[derive(Clone)]
pub struct PgUrlStore {
    pool: PgPool,
}

impl PgUrlStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Deletes the record for `short_code`. Returns `false` if it did not exist.
    pub async fn delete(&self, short_code: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM urls WHERE short_code = $1")
            .bind(short_code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all records and the expired ones among them.
    pub async fn stats(&self) -> Result<UrlStats, StoreError> {
        let (total, expired): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE expires_at IS NOT NULL AND expires_at <= NOW())
            FROM urls
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(UrlStats { total, expired })
    }
}

#[async_trait]
impl UrlStore for PgUrlStore {
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<String>, StoreError> {
        let code = sqlx::query_scalar("SELECT short_code FROM urls WHERE long_url = $1")
            .bind(long_url)
            .fetch_optional(&self.pool)
            .await?;

        Ok(code)
    }

    async fn insert_if_absent(
        &self,
        short_code: &str,
        long_url: &str,
    ) -> Result<InsertOutcome, StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO urls (short_code, long_url)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(short_code)
        .bind(long_url)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 1 {
            return Ok(InsertOutcome::Inserted);
        }

        let conflicts: Vec<(String, String)> = sqlx::query_as(
            "SELECT short_code, long_url FROM urls WHERE short_code = $1 OR long_url = $2",
        )
        .bind(short_code)
        .bind(long_url)
        .fetch_all(&self.pool)
        .await?;

        if let Some((code, _)) = conflicts.iter().find(|(_, url)| url == long_url) {
            if code == short_code {
                return Ok(InsertOutcome::AlreadyExists {
                    long_url: long_url.to_string(),
                });
            }
            return Ok(InsertOutcome::LongUrlExists {
                short_code: code.clone(),
            });
        }

        match conflicts.into_iter().find(|(code, _)| code == short_code) {
            Some((_, existing)) => Ok(InsertOutcome::AlreadyExists { long_url: existing }),
            None => Err(StoreError::Unavailable(format!(
                "insert of {short_code} conflicted but no conflicting row was found"
            ))),
        }
    }

    async fn find_by_short_code(&self, short_code: &str) -> Result<Option<UrlRecord>, StoreError> {
        let row: Option<UrlRow> = sqlx::query_as(
            r#"
            SELECT short_code, long_url, created_at, expires_at
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(short_code, long_url, created_at, expires_at)| {
            UrlRecord::new(short_code, long_url, created_at, expires_at)
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
