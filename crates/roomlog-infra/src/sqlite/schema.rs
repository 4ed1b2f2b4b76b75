//! Schema manager.
//!
//! Creates the `rooms`, `messages` and `replies` tables when absent and
//! brings older stores forward. Safe to run on every start.
//!
//! Timestamps are stored as `YYYY-MM-DDTHH:MM:SS.sssZ` text assigned by the
//! store. Stores written by earlier versions may hold second-resolution
//! `YYYY-MM-DD HH:MM:SS` values; queries order through `julianday()` so both
//! formats sort together.

use roomlog_types::error::RepositoryError;
use sqlx::SqlitePool;
use tracing::{debug, info};

const CREATE_ROOMS: &str = r#"
CREATE TABLE IF NOT EXISTS rooms (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#;

const CREATE_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    room_id     INTEGER NOT NULL REFERENCES rooms(id),
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#;

const CREATE_REPLIES: &str = r#"
CREATE TABLE IF NOT EXISTS replies (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id       INTEGER NOT NULL REFERENCES messages(id),
    body             TEXT NOT NULL,
    attachment_path  TEXT,
    created_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)"#;

const CREATE_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_messages_room ON messages(room_id)",
    "CREATE INDEX IF NOT EXISTS idx_replies_message ON replies(message_id)",
];

/// Create missing tables and add columns introduced after a store was created.
///
/// Any DDL failure is returned as `RepositoryError::Schema`.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepositoryError> {
    for ddl in [CREATE_ROOMS, CREATE_MESSAGES, CREATE_REPLIES] {
        run_ddl(pool, ddl).await?;
    }

    let columns = table_columns(pool, "replies").await?;
    if !columns.iter().any(|c| c == "attachment_path") {
        info!("Adding attachment_path column to replies");
        run_ddl(pool, "ALTER TABLE replies ADD COLUMN attachment_path TEXT").await?;
    }

    for ddl in CREATE_INDEXES {
        run_ddl(pool, ddl).await?;
    }

    debug!("Schema ready");
    Ok(())
}

/// Column names of `table`, in declaration order.
pub async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<String>, RepositoryError> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM pragma_table_info(?) ORDER BY cid")
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(|e| RepositoryError::Schema(e.to_string()))?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

async fn run_ddl(pool: &SqlitePool, ddl: &str) -> Result<(), RepositoryError> {
    sqlx::query(ddl)
        .execute(pool)
        .await
        .map_err(|e| RepositoryError::Schema(e.to_string()))?;
    Ok(())
}
