//! Retry for transient remote (Turso) errors.
//!
//! Turso occasionally answers with Hrana errors while a node is being
//! recycled or a shared lock is contended; these clear up within seconds.
//! Local databases never see them, so only remote handles retry.

use std::future::Future;
use std::time::Duration;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Backoff is capped here.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), doubling each time.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Detect transient Turso infrastructure errors.
///
/// Deliberately narrow: SQL and constraint errors are never retried.
pub fn is_transient_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("unable to acquire shared lock")
        || msg.contains("deletion must be in progress")
        || msg.contains("stream expired")
}

/// Run `op`, retrying transient libSQL errors with exponential backoff.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-transient error immediately.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, DatabaseError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DatabaseError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(DatabaseError::LibSql(e))
                if attempt < config.max_attempts && is_transient_error(&e) =>
            {
                let delay = config.delay_for(attempt);
                tracing::warn!(attempt, ?delay, error = %e, "transient libSQL error; retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
