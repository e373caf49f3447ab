use crate::shared::infrastructure::database::{ErrorKind, StoreError};
use std::future::Future;

/// Retries after the first attempt for non-transactional calls.
pub const MAX_RETRIES: u32 = 2;

/// Runs `operation` until it succeeds, fails permanently, or has been attempted
/// `max_retries + 1` times. Each attempt is expected to open its own
/// connection, so a retry also picks up a refreshed token.
pub async fn execute_with_retry<T, TOperation, TFuture>(
    operation_name: &str,
    max_retries: u32,
    mut operation: TOperation,
) -> Result<T, StoreError>
where
    TOperation: FnMut() -> TFuture,
    TFuture: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.kind() == ErrorKind::Transient => {
                if attempt > max_retries {
                    tracing::error!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %err,
                        "giving up after transient failures"
                    );
                    return Err(StoreError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    error = %err,
                    "transient failure, retrying with a fresh connection"
                );
            }
            Err(err) => return Err(err),
        }
    }
}
