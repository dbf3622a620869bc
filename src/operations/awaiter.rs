//! Operation Awaiter
//!
//! Polls a server-tracked operation until it reaches a terminal status,
//! sleeping for the server-dictated `retry_in` between polls. There is no
//! attempt cap, jitter or client-side backoff.

use crate::domain::{Operation, OperationStatus, OperationsApi};
use crate::error::{Error, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Wait for an operation to reach `Succeeded` or `Failed`
///
/// A `Failed` operation is returned as [`Error::OperationFailed`] when
/// `fail_on_failure` is set, otherwise it is handed back for the caller to
/// inspect. API and transport errors raised while polling propagate
/// immediately.
pub async fn await_operation<C>(
    client: &C,
    operation_id: &str,
    fail_on_failure: bool,
) -> Result<Operation>
where
    C: OperationsApi + ?Sized,
{
    poll_until_terminal(client, operation_id, fail_on_failure, None).await
}

/// Same as [`await_operation`], but gives up when `cancel` fires
pub async fn await_operation_cancellable<C>(
    client: &C,
    operation_id: &str,
    fail_on_failure: bool,
    cancel: &CancellationToken,
) -> Result<Operation>
where
    C: OperationsApi + ?Sized,
{
    poll_until_terminal(client, operation_id, fail_on_failure, Some(cancel)).await
}

async fn poll_until_terminal<C>(
    client: &C,
    operation_id: &str,
    fail_on_failure: bool,
    cancel: Option<&CancellationToken>,
) -> Result<Operation>
where
    C: OperationsApi + ?Sized,
{
    info!("Waiting for operation {}", operation_id);
    let cancelled = || Error::Cancelled {
        operation_id: operation_id.to_string(),
    };

    let mut polls: u64 = 0;
    loop {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(cancelled());
        }

        let op = client.get_operation(operation_id).await?;
        polls += 1;

        match op.status {
            OperationStatus::Succeeded => {
                info!(
                    "Operation {} ({}) succeeded after {} polls",
                    op.id, op.request_type, polls
                );
                return Ok(op);
            }
            OperationStatus::Failed => {
                if fail_on_failure {
                    return Err(Error::operation_failed(op));
                }
                warn!(
                    "Operation {} ({}) failed; returning it to the caller",
                    op.id, op.request_type
                );
                return Ok(op);
            }
            OperationStatus::Pending | OperationStatus::Aborting => {
                let delay = op.retry_delay();
                debug!(
                    "Operation {} is {}, polling again in {:?}",
                    op.id, op.status, delay
                );

                match cancel {
                    Some(token) => {
                        tokio::select! {
                            _ = token.cancelled() => return Err(cancelled()),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                    None => tokio::time::sleep(delay).await,
                }
            }
        }
    }
}
