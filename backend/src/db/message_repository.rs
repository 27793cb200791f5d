use chrono::Utc;
use serde::Serialize;
use shared::ClassificationMeta;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// A stored message document, as returned by the result lookup endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StoredMessage {
    pub id: String,
    pub source: String,
    pub message: String,
    pub after_hours: bool,
    pub status: String,
    pub result: Option<String>,
    pub meta: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone)]
pub struct MessageRepository {
    pool: Pool<Sqlite>,
}

impl MessageRepository {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options =
            SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        ensure_schema(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn insert_message(
        &self,
        source: &str,
        message: &str,
        after_hours: bool,
    ) -> Result<String, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO messages (id, source, message, after_hours, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 'new', ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(source)
        .bind(message)
        .bind(after_hours)
        .bind(now)
        .execute(&self.pool)
        .await?;
        log::info!("Inserted new message {} from {}", id, source);
        Ok(id)
    }

    pub async fn update_result(
        &self,
        id: &str,
        result: &str,
        meta: &ClassificationMeta,
    ) -> Result<bool, sqlx::Error> {
        let meta_json =
            serde_json::to_string(meta).unwrap_or_else(|_| "{}".to_string());
        let rows = sqlx::query(
            r#"
            UPDATE messages
            SET result = ?1, status = 'processed', meta = ?2, updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(result)
        .bind(meta_json)
        .bind(Utc::now().timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();
        log::info!("Updated result for {} => {}", id, result);
        Ok(rows > 0)
    }

    pub async fn mark_error(&self, id: &str, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE messages
            SET status = 'error', error = ?1, updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(error)
        .bind(Utc::now().timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Messages that never received a verdict, oldest first.
    pub async fn find_unprocessed(&self, limit: i64) -> Result<Vec<StoredMessage>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, source, message, after_hours, status, result, meta, error,
                   created_at, updated_at
            FROM messages
            WHERE status = 'new' OR result IS NULL
            ORDER BY created_at ASC, rowid ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_message).collect())
    }

    pub async fn get_message(&self, id: &str) -> Result<Option<StoredMessage>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, source, message, after_hours, status, result, meta, error,
                   created_at, updated_at
            FROM messages
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_message))
    }
}

fn row_to_message(row: &SqliteRow) -> StoredMessage {
    let meta = row
        .get::<Option<String>, _>("meta")
        .and_then(|raw| serde_json::from_str(&raw).ok());
    StoredMessage {
        id: row.get("id"),
        source: row.get("source"),
        message: row.get("message"),
        after_hours: row.get("after_hours"),
        status: row.get("status"),
        result: row.get("result"),
        meta,
        error: row.get("error"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

async fn ensure_schema(pool: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            message TEXT NOT NULL,
            after_hours INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'new',
            result TEXT,
            meta TEXT,
            error TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_messages_status ON messages(status, created_at)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<(), AppError> {
    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if path.contains(":memory:") || path.is_empty() {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("cannot create {}: {}", parent.display(), e)))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    async fn temp_repo() -> MessageRepository {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let db_path = std::env::temp_dir()
            .join(format!("upay_repo_test_{suffix}"))
            .join("messages.db");
        let url = format!("sqlite://{}", db_path.to_string_lossy());
        MessageRepository::connect(&url).await.expect("connect")
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let repo = temp_repo().await;
        let id = repo
            .insert_message("website", "hello there", true)
            .await
            .expect("insert");

        let stored = repo.get_message(&id).await.expect("get").expect("found");
        assert_eq!(stored.source, "website");
        assert_eq!(stored.message, "hello there");
        assert!(stored.after_hours);
        assert_eq!(stored.status, "new");
        assert!(stored.result.is_none());
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let repo = temp_repo().await;
        let missing = repo.get_message("no-such-id").await.expect("get");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn update_result_marks_processed_and_stores_meta() {
        let repo = temp_repo().await;
        let id = repo
            .insert_message("app", "check this", false)
            .await
            .expect("insert");

        let meta = ClassificationMeta {
            origin: Some("offline".into()),
            after_hours: Some(false),
            offline_label: Some("Fraud".into()),
            ..ClassificationMeta::default()
        };
        assert!(repo.update_result(&id, "Fraud", &meta).await.expect("update"));

        let stored = repo.get_message(&id).await.expect("get").expect("found");
        assert_eq!(stored.status, "processed");
        assert_eq!(stored.result.as_deref(), Some("Fraud"));
        let stored_meta = stored.meta.expect("meta");
        assert_eq!(stored_meta["origin"], "offline");

        assert!(!repo
            .update_result("missing", "Fraud", &ClassificationMeta::default())
            .await
            .expect("update"));
    }

    #[tokio::test]
    async fn mark_error_records_the_failure() {
        let repo = temp_repo().await;
        let id = repo
            .insert_message("database", "bad row", false)
            .await
            .expect("insert");
        repo.mark_error(&id, "boom").await.expect("mark");

        let stored = repo.get_message(&id).await.expect("get").expect("found");
        assert_eq!(stored.status, "error");
        assert_eq!(stored.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn find_unprocessed_skips_processed_rows_oldest_first() {
        let repo = temp_repo().await;
        let first = repo.insert_message("website", "one", false).await.unwrap();
        let second = repo.insert_message("website", "two", false).await.unwrap();
        let done = repo.insert_message("website", "three", false).await.unwrap();
        repo.update_result(&done, "Not Fraud", &ClassificationMeta::default())
            .await
            .unwrap();

        let pending = repo.find_unprocessed(100).await.expect("query");
        let ids: Vec<&str> = pending.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str()]);

        let limited = repo.find_unprocessed(1).await.expect("query");
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, first);
    }
}
