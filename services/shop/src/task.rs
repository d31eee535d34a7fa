//! Bounded execution of request work
//!
//! Every protected handler runs its work on a separate Tokio task and waits
//! for it no longer than the route's budget. When the deadline passes the
//! client gets `REQUEST_TIMEOUT` right away while the worker is left running
//! to completion in the background; its result is discarded but any side
//! effects it performs after the deadline still happen.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::ApiError;

/// Deadline classes used by the HTTP handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Single-entity reads
    Short,
    /// List reads and cart removal
    Medium,
    /// Mutations, payment, login and token refresh
    Long,
}

impl Budget {
    pub const fn duration(self) -> Duration {
        match self {
            Budget::Short => Duration::from_secs(1),
            Budget::Medium => Duration::from_secs(2),
            Budget::Long => Duration::from_secs(3),
        }
    }
}

impl From<Budget> for Duration {
    fn from(budget: Budget) -> Self {
        budget.duration()
    }
}

/// Run `work` on its own task and wait at most `deadline` for it.
///
/// The worker's own `Result` is passed through unchanged. A worker that
/// panics becomes an internal error. On timeout the join handle is dropped,
/// which detaches the task instead of aborting it.
pub async fn run_with_deadline<T, F>(deadline: impl Into<Duration>, work: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>> + Send + 'static,
    T: Send + 'static,
{
    let deadline = deadline.into();
    let handle = tokio::spawn(work);

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(result)) => result,
        // logged once, when the internal error is rendered
        Ok(Err(join_error)) => Err(ApiError::Internal(anyhow::anyhow!(
            "request worker failed: {join_error}"
        ))),
        Err(_) => {
            warn!(deadline_ms = deadline.as_millis() as u64, "request deadline exceeded");
            Err(ApiError::RequestTimeout)
        }
    }
}
