//! Submission composition: build the record and post it.

use std::time::Duration;
use tracing::{info, warn};

use batchprover_config::Config;
use batchprover_coordinator::{
    Coordinator, CoordinatorResponse, ParticipantId, SubmissionMetadata, SubmissionRecord,
};
use batchprover_utils::error::SubmitError;
use batchprover_utils::types::Acceleration;

use crate::reporter::Reporter;

/// Submission inputs resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSettings {
    /// Fixed proving time in milliseconds; `None` reports the measured time
    pub proving_time: Option<u64>,
    pub cost: u64,
    pub price: u64,
    pub acceleration: Acceleration,
    pub deployment_version: u32,
    /// Treat a non-2xx submit status as a failure
    pub strict: bool,
}

impl SubmissionSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            proving_time: config.proving_time_override(),
            cost: config.cost(),
            price: config.price(),
            acceleration: config.acceleration(),
            deployment_version: config.deployment_version(),
            strict: config.strict_submit(),
        }
    }

    /// Metadata for one submission, falling back to `measured` for the
    /// proving time.
    #[must_use]
    pub fn metadata(&self, measured: Duration) -> SubmissionMetadata {
        SubmissionMetadata {
            proving_time: self
                .proving_time
                .unwrap_or_else(|| u64::try_from(measured.as_millis()).unwrap_or(u64::MAX)),
            cost: self.cost,
            price: self.price,
            acceleration: self.acceleration.clone(),
            deployment_version: self.deployment_version,
        }
    }
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            proving_time: None,
            cost: 0,
            price: 0,
            acceleration: Acceleration::None,
            deployment_version: batchprover_config::DEFAULT_DEPLOYMENT_VERSION,
            strict: false,
        }
    }
}

/// Post `record` and surface the response.
///
/// Any response is reported verbatim. In lenient mode every response
/// completes the run; in strict mode a non-2xx status is an error.
///
/// # Errors
///
/// - `SubmitError::Unreachable` when no response was received
/// - `SubmitError::Rejected` for a non-2xx status when `strict` is set
pub async fn submit_proof<C>(
    coordinator: &C,
    participant: &ParticipantId,
    record: &SubmissionRecord,
    strict: bool,
    reporter: &dyn Reporter,
) -> Result<CoordinatorResponse, SubmitError>
where
    C: Coordinator + ?Sized,
{
    reporter.submit_started();

    let response = coordinator
        .submit_proof(participant, record)
        .await
        .map_err(|e| SubmitError::Unreachable(e.to_string()))?;

    reporter.submit_response(&response);

    if response.is_success() {
        info!(status = response.status, request_id = record.request_id(), "Proof accepted");
    } else if strict {
        return Err(SubmitError::Rejected {
            status: response.status,
            body: response.body_text(),
        });
    } else {
        warn!(
            status = response.status,
            request_id = record.request_id(),
            "Submission returned a non-success status"
        );
    }

    Ok(response)
}
