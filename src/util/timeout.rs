//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::GeneratorError;

/// Wrap a future with an optional timeout. `None` waits indefinitely.
pub async fn with_timeout<T>(
    duration: Option<Duration>,
    future: impl Future<Output = Result<T, GeneratorError>>,
) -> Result<T, GeneratorError> {
    let Some(duration) = duration else {
        return future.await;
    };
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(GeneratorError::Timeout(millis(duration))),
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
