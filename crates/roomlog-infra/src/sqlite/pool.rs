//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` keeps a
//! multi-connection reader pool for concurrent reads and a single-connection
//! writer pool for serialized writes. Both use WAL journal mode and enforce
//! foreign keys.

use std::path::Path;
use std::str::FromStr;

use roomlog_types::error::RepositoryError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use super::schema;

/// Split read/write pool for SQLite with WAL mode.
///
/// - `reader`: Multi-connection pool (up to 8) for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERT/UPDATE.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open (creating if needed) the store at `database_url`.
    ///
    /// Runs the schema manager on the writer before the reader pool is
    /// opened; a schema failure aborts with `RepositoryError::Schema`.
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let base_opts = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::Connection(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5))
            .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        schema::ensure_schema(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(read_opts)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;

        Ok(Self { reader, writer })
    }

    /// Open the store file `database_file` inside `data_dir`.
    pub async fn open(data_dir: &Path, database_file: &str) -> Result<Self, RepositoryError> {
        Self::new(&database_url(data_dir, database_file)).await
    }
}

/// SQLite URL for `database_file` inside `data_dir`.
pub fn database_url(data_dir: &Path, database_file: &str) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join(database_file).display())
}
