//! Local provisioning history
//!
//! Append-only SQLite table recording which input was applied to which environment, by whom
//! and when. The table is created on first use.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::constants::{HISTORY_DB_EXTENSION, HISTORY_TABLE, UNKNOWN_USER};
use crate::error::{Error, Result};

const FIND_TABLE_SQL: &str = "SELECT name FROM sqlite_master WHERE type='table' AND name=?";

const CREATE_TABLE_SQL: &str = "CREATE TABLE History (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    input_file varchar(80) NOT NULL,
    output_file varchar(80),
    environment varchar(20),
    timestamp DATETIME,
    user varchar(20))";

const INSERT_SQL: &str = "INSERT INTO History (input_file, output_file, environment, timestamp, user)
    VALUES (?, ?, ?, ?, ?)";

/// A row to append; the id is assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryRecord {
    /// File that was applied
    pub input_file:  String,
    /// Report written for the run, if any
    pub output_file: Option<String>,
    /// Environment the input was applied to
    pub environment: Option<String>,
    /// When the run happened
    pub timestamp:   DateTime<Utc>,
    /// OS user that ran it
    pub user:        Option<String>,
}

impl NewHistoryRecord {
    /// Record stamped with the current time and OS user
    #[must_use]
    pub fn now(
        input_file: impl Into<String>,
        output_file: Option<String>,
        environment: Option<String>,
    ) -> Self {
        Self {
            input_file: input_file.into(),
            output_file,
            environment,
            timestamp: Utc::now(),
            user: Some(current_user()),
        }
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| UNKNOWN_USER.to_string())
}

/// Handle on the history database
pub struct History {
    pool: SqlitePool,
    path: PathBuf,
}

impl History {
    /// Open `<dir>/<db_name>.db`, creating the file and the table when missing
    pub async fn open(dir: impl AsRef<Path>, db_name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| Error::from_io("create", dir, e))?;
        let path = dir.join(format!("{db_name}.{HISTORY_DB_EXTENSION}"));

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let history = Self { pool, path };
        history.ensure_schema().await?;
        Ok(history)
    }

    /// Database file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the table unless it exists; returns whether it was created
    pub async fn ensure_schema(&self) -> Result<bool> {
        let existing: Option<(String,)> = sqlx::query_as(FIND_TABLE_SQL)
            .bind(HISTORY_TABLE)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            debug!("history table present in {}", self.path.display());
            return Ok(false);
        }

        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        info!("created history table in {}", self.path.display());
        Ok(true)
    }

    /// Insert one row and return its id
    pub async fn append(&self, record: &NewHistoryRecord) -> Result<i64> {
        let result = sqlx::query(INSERT_SQL)
            .bind(record.input_file.as_str())
            .bind(record.output_file.as_deref())
            .bind(record.environment.as_deref())
            .bind(record.timestamp)
            .bind(record.user.as_deref())
            .execute(&self.pool)
            .await?;
        let id = result.last_insert_rowid();
        debug!("history record {id} appended for {}", record.input_file);
        Ok(id)
    }

    /// Close the pool, flushing pending writes
    pub async fn close(self) {
        self.pool.close().await;
    }
}
