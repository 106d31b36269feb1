//! SQLite news store implementation

use async_trait::async_trait;
use news_fetcher_domain::{NewsRecord, NewsStore, Source, StoreError, UpsertOutcome};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;

/// SQLite-backed news store, keyed by (external_id, source)
pub struct SqliteNewsStore {
    pool: SqlitePool,
}

impl SqliteNewsStore {
    /// Create a new SQLite news store, initializing the database if needed
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("Failed to create directory: {}", e)))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news (
                external_id TEXT NOT NULL,
                source TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                excerpt TEXT NOT NULL,
                image TEXT,
                link TEXT NOT NULL,
                date TEXT NOT NULL,
                is_manual INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (external_id, source)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl NewsStore for SqliteNewsStore {
    async fn find_by_external_id(
        &self,
        external_id: &str,
        source: Source,
    ) -> Result<Option<NewsRecord>, StoreError> {
        let row: Option<(String, String, String, Option<String>, String, String, bool)> =
            sqlx::query_as(
                r#"
                SELECT title, content, excerpt, image, link, date, is_manual
                FROM news
                WHERE external_id = ? AND source = ?
                "#,
            )
            .bind(external_id)
            .bind(source.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(row.map(
            |(title, content, excerpt, image, link, date, is_manual)| NewsRecord {
                source,
                title,
                content,
                excerpt,
                image,
                link,
                date,
                external_id: external_id.to_string(),
                is_manual,
            },
        ))
    }

    async fn upsert(&self, record: &NewsRecord) -> Result<UpsertOutcome, StoreError> {
        // manual-edit precondition: an edited record is immutable to the pipeline
        let existing: Option<(bool,)> =
            sqlx::query_as("SELECT is_manual FROM news WHERE external_id = ? AND source = ?")
                .bind(&record.external_id)
                .bind(record.source.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

        match existing {
            Some((true,)) => Ok(UpsertOutcome::SkippedManual),
            Some((false,)) => {
                // fields are replaced wholesale; is_manual is never touched
                sqlx::query(
                    r#"
                    UPDATE news
                    SET title = ?, content = ?, excerpt = ?, image = ?, link = ?, date = ?
                    WHERE external_id = ? AND source = ?
                    "#,
                )
                .bind(&record.title)
                .bind(&record.content)
                .bind(&record.excerpt)
                .bind(&record.image)
                .bind(&record.link)
                .bind(&record.date)
                .bind(&record.external_id)
                .bind(record.source.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

                Ok(UpsertOutcome::Updated)
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO news
                    (external_id, source, title, content, excerpt, image, link, date, is_manual)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)
                    "#,
                )
                .bind(&record.external_id)
                .bind(record.source.as_str())
                .bind(&record.title)
                .bind(&record.content)
                .bind(&record.excerpt)
                .bind(&record.image)
                .bind(&record.link)
                .bind(&record.date)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

                Ok(UpsertOutcome::Created)
            }
        }
    }
}
