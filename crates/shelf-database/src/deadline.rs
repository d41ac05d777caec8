//! Deadlines for storage calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use shelf_core::error::AppError;
use shelf_core::result::AppResult;

/// Run a storage operation, failing with `StorageTimeout` once `deadline` elapses.
///
/// The inner future is dropped on timeout, which cancels the in-flight query.
pub async fn with_deadline<T, F>(deadline: Duration, operation: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation,
                deadline_ms = deadline.as_millis() as u64,
                "Storage call exceeded its deadline"
            );
            Err(AppError::storage_timeout(format!(
                "{operation} did not complete within {}ms",
                deadline.as_millis()
            )))
        }
    }
}
