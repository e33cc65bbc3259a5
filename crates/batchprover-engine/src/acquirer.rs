//! Batch acquisition: fetch a batch and validate the response.

use tracing::{debug, warn};

use batchprover_coordinator::{BatchDescriptor, Coordinator, ParticipantId};
use batchprover_utils::error::FetchError;

use crate::reporter::Reporter;

/// Request a batch for `participant` and validate the response.
///
/// # Errors
///
/// - `FetchError::Unreachable` when no response was received
/// - `FetchError::Rejected` for a non-2xx status, carrying the raw body
/// - `FetchError::Malformed` for a 2xx body that is not a batch descriptor
pub async fn acquire_batch<C>(
    coordinator: &C,
    participant: &ParticipantId,
    reporter: &dyn Reporter,
) -> Result<BatchDescriptor, FetchError>
where
    C: Coordinator + ?Sized,
{
    reporter.fetch_started();

    let response = coordinator
        .fetch_batch(participant)
        .await
        .map_err(|e| FetchError::Unreachable(e.to_string()))?;

    if !response.is_success() {
        warn!(status = response.status, "Batch request rejected");
        return Err(FetchError::Rejected {
            status: response.status,
            body: response.body_text(),
        });
    }

    let batch = BatchDescriptor::from_response_body(&response.body).map_err(|e| {
        FetchError::Malformed {
            reason: e.to_string(),
            body: response.body_text(),
        }
    })?;

    debug!(
        request_id = batch.request_id(),
        batch_file = batch.batch_file(),
        "Batch accepted"
    );
    reporter.batch_received(&response);

    Ok(batch)
}
