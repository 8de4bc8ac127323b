use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use smartchoice_core::recommend::Profile;

use super::{RepositoryError, SearchHistoryEntry, SearchHistoryRepository};
use crate::DbPool;

pub struct SqlSearchHistoryRepository {
    pool: DbPool,
}

impl SqlSearchHistoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<SearchHistoryEntry, RepositoryError> {
    let decode = |e: sqlx::Error| RepositoryError::Decode(e.to_string());

    let id: i64 = row.try_get("id").map_err(decode)?;
    let query: String = row.try_get("search_query").map_err(decode)?;
    let category: Option<String> = row.try_get("category").map_err(decode)?;
    let budget: f64 = row.try_get("budget").map_err(decode)?;
    let social_class: String = row.try_get("social_class").map_err(decode)?;
    let results_count: i64 = row.try_get("results_count").map_err(decode)?;
    let created_at_str: String = row.try_get("created_at").map_err(decode)?;

    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(SearchHistoryEntry {
        id: Some(id),
        query,
        category,
        budget,
        profile: Profile::parse_lenient(&social_class),
        results_count: u32::try_from(results_count).unwrap_or(u32::MAX),
        created_at,
    })
}

#[async_trait::async_trait]
impl SearchHistoryRepository for SqlSearchHistoryRepository {
    async fn record(&self, entry: SearchHistoryEntry) -> Result<i64, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO search_history
                (search_query, category, budget, social_class, results_count, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.query)
        .bind(&entry.category)
        .bind(entry.budget)
        .bind(entry.profile.as_str())
        .bind(i64::from(entry.results_count))
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<SearchHistoryEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, search_query, category, budget, social_class, results_count, created_at
             FROM search_history
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_entry).collect::<Result<Vec<_>, _>>()
    }
}
