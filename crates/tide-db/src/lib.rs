//! # tide-db
//!
//! libSQL storage for Tide tasks.
//!
//! [`TaskDb`] is the authoritative store behind the timeline engine: it
//! implements `tide_engine::TaskSource` and `tide_engine::TaskSink` over a
//! local file, an in-memory database (`:memory:`, for tests), or a remote
//! Turso database. Writes run the same mutation rules as the engine's
//! optimistic apply (`tide_core::mutation`), so both sides agree on derived
//! fields such as `completed_at` and `original_due_date`.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
mod store;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use error::DatabaseError;
use libsql::Builder;
use retry::{RetryConfig, with_retry};
use tide_core::clock::{Clock, SystemClock};

/// Database handle for Tide task state.
pub struct TaskDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    clock: Arc<dyn Clock>,
    retry: Option<RetryConfig>,
}

impl TaskDb {
    /// Open a local database at `path`, creating parent directories.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Other(anyhow::anyhow!("create {}: {e}", parent.display()))
                })?;
            }
        }
        let db = Builder::new_local(path).build().await?;
        Self::init(db, None).await
    }

    /// Open a remote Turso database. Transient remote errors are retried.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection or migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        Self::init(db, Some(RetryConfig::default())).await
    }

    async fn init(db: libsql::Database, retry: Option<RetryConfig>) -> Result<Self, DatabaseError> {
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let task_db = Self {
            db,
            conn,
            clock: Arc::new(SystemClock::new()),
            retry,
        };
        task_db.run_migrations().await?;
        tracing::debug!(remote = task_db.is_remote(), "database opened");
        Ok(task_db)
    }

    /// Use `clock` for every timestamp this handle writes.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.retry.is_some()
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"tsk-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Run `op` once locally, or with transient-error retry when remote.
    pub(crate) async fn retrying<T, F, Fut>(&self, mut op: F) -> Result<T, DatabaseError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DatabaseError>>,
    {
        match &self.retry {
            Some(config) => with_retry(config, op).await,
            None => op().await,
        }
    }
}
