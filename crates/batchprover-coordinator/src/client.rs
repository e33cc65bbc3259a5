//! The coordinator seam and its HTTP implementation.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::CoordinatorError;
use crate::http_client::HttpClient;
use crate::types::{CoordinatorAddress, CoordinatorResponse, ParticipantId, SubmissionRecord};

const GET_BATCH: &str = "get_batch";
const SUBMIT_PROOF: &str = "submit_proof";

/// Remote service issuing batches and accepting proofs.
///
/// Implementations return every HTTP response as a [`CoordinatorResponse`],
/// success or not; only failures to obtain a response are errors.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Base address batch locations are resolved against.
    fn address(&self) -> &CoordinatorAddress;

    /// `GET {base}/get_batch/?participant_id={id}`
    async fn fetch_batch(
        &self,
        participant: &ParticipantId,
    ) -> Result<CoordinatorResponse, CoordinatorError>;

    /// `POST {base}/submit_proof/?participant_id={id}` with `record` as JSON
    async fn submit_proof(
        &self,
        participant: &ParticipantId,
        record: &SubmissionRecord,
    ) -> Result<CoordinatorResponse, CoordinatorError>;
}

/// Coordinator reached over HTTP(S).
///
/// # Example
///
/// ```rust,no_run
/// use batchprover_coordinator::{Coordinator, CoordinatorAddress, HttpCoordinator, ParticipantId};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let address = CoordinatorAddress::parse("http://localhost:8080")?;
/// let coordinator = HttpCoordinator::new(address, Duration::from_secs(30), None)?;
/// let response = coordinator.fetch_batch(&ParticipantId::new("alice")?).await?;
/// println!("{} {}", response.status, response.body_text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpCoordinator {
    address: CoordinatorAddress,
    http: HttpClient,
}

impl HttpCoordinator {
    /// # Errors
    ///
    /// Returns `CoordinatorError::Misconfiguration` if the HTTP client cannot be built.
    pub fn new(
        address: CoordinatorAddress,
        connect_timeout: Duration,
        request_timeout: Option<Duration>,
    ) -> Result<Self, CoordinatorError> {
        Ok(Self {
            address,
            http: HttpClient::new(connect_timeout, request_timeout)?,
        })
    }
}

#[async_trait]
impl Coordinator for HttpCoordinator {
    fn address(&self) -> &CoordinatorAddress {
        &self.address
    }

    async fn fetch_batch(
        &self,
        participant: &ParticipantId,
    ) -> Result<CoordinatorResponse, CoordinatorError> {
        let url = self.address.endpoint(GET_BATCH, participant)?;
        debug!(endpoint = GET_BATCH, "Sending batch request");
        self.http
            .execute(self.http.client().get(url), "Batch")
            .await
    }

    async fn submit_proof(
        &self,
        participant: &ParticipantId,
        record: &SubmissionRecord,
    ) -> Result<CoordinatorResponse, CoordinatorError> {
        let url = self.address.endpoint(SUBMIT_PROOF, participant)?;
        debug!(
            endpoint = SUBMIT_PROOF,
            request_id = record.request_id(),
            "Sending proof submission"
        );
        self.http
            .execute(self.http.client().post(url).json(record), "Submit")
            .await
    }
}
