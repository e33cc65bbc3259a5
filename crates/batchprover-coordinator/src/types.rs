//! Domain and wire types exchanged with the coordinator.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

use batchprover_utils::types::Acceleration;

use crate::error::{CoordinatorError, MalformedBatch};

/// Caller-supplied token identifying who fetches and submits.
///
/// Sent unmodified (query-encoded) on both calls of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// # Errors
    ///
    /// Returns `CoordinatorError::EmptyParticipantId` for an empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, CoordinatorError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoordinatorError::EmptyParticipantId);
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base address of the coordinator service.
///
/// Always an absolute `http` or `https` URL, stored without trailing `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorAddress {
    base: String,
}

impl CoordinatorAddress {
    /// Parse and normalize a coordinator address.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::InvalidAddress` when the address is not an
    /// absolute http(s) URL with a host.
    ///
    /// # Example
    ///
    /// ```rust
    /// use batchprover_coordinator::CoordinatorAddress;
    ///
    /// let address = CoordinatorAddress::parse("http://localhost:8080/api/").unwrap();
    /// assert_eq!(address.as_str(), "http://localhost:8080/api");
    /// ```
    pub fn parse(address: &str) -> Result<Self, CoordinatorError> {
        let invalid = |reason: String| CoordinatorError::InvalidAddress {
            address: address.to_string(),
            reason,
        };

        let base = address.trim().trim_end_matches('/');
        let url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected http or https",
                url.scheme()
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not contain a query or fragment".to_string()));
        }

        Ok(Self {
            base: base.to_string(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// `{base}/{path}`, with one leading `/` of `path` dropped.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.strip_prefix('/').unwrap_or(path))
    }

    /// `{base}/{endpoint}/?participant_id={id}` with the id query-encoded.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::InvalidAddress` if the joined URL does not parse.
    pub fn endpoint(
        &self,
        endpoint: &str,
        participant: &ParticipantId,
    ) -> Result<Url, CoordinatorError> {
        let joined = format!("{}/", self.join(endpoint));
        let mut url = Url::parse(&joined).map_err(|e| CoordinatorError::InvalidAddress {
            address: joined.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("participant_id", participant.as_str());
        Ok(url)
    }
}

impl fmt::Display for CoordinatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

/// A batch issued by the coordinator.
///
/// Only `request_id` and `batch_file` are interpreted. Everything else in the
/// response is kept as-is in [`extra`](Self::extra).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDescriptor {
    request_id: String,
    batch_file: String,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl BatchDescriptor {
    #[must_use]
    pub fn new(request_id: impl Into<String>, batch_file: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            batch_file: batch_file.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Parse a fetch response body.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedBatch`] when the body is not a JSON object with
    /// non-empty string `request_id` and `batch_file` fields.
    pub fn from_response_body(body: &[u8]) -> Result<Self, MalformedBatch> {
        let descriptor: Self =
            serde_json::from_slice(body).map_err(|e| MalformedBatch(e.to_string()))?;

        if descriptor.request_id.is_empty() {
            return Err(MalformedBatch("field `request_id` is empty".to_string()));
        }
        if descriptor.batch_file.is_empty() {
            return Err(MalformedBatch("field `batch_file` is empty".to_string()));
        }

        Ok(descriptor)
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    #[must_use]
    pub fn batch_file(&self) -> &str {
        &self.batch_file
    }

    #[must_use]
    pub fn extra(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extra
    }

    /// Location the prover reads the batch from: `{base}/{batch_file}`.
    #[must_use]
    pub fn resolve_location(&self, address: &CoordinatorAddress) -> String {
        address.join(&self.batch_file)
    }
}

/// Raw bytes produced by the prover on stdout. Never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofArtifact(Vec<u8>);

impl ProofArtifact {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Standard base64 with padding.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }
}

/// Cost and performance metadata attached to a submission.
///
/// `cost` and `price` are hundredths of a currency unit; `proving_time` is
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionMetadata {
    pub proving_time: u64,
    pub cost: u64,
    pub price: u64,
    pub acceleration: Acceleration,
    pub deployment_version: u32,
}

/// The JSON body of a proof submission.
///
/// Built once per run from the fetched batch, the artifact and the metadata,
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    request_id: String,
    proof_data: String,
    proving_time: u64,
    cost: u64,
    price: u64,
    acceleration: Acceleration,
    deployment_version: u32,
}

impl SubmissionRecord {
    /// Compose the record for `batch`. The `request_id` is taken from the
    /// batch verbatim.
    #[must_use]
    pub fn compose(
        batch: &BatchDescriptor,
        artifact: &ProofArtifact,
        metadata: &SubmissionMetadata,
    ) -> Self {
        Self {
            request_id: batch.request_id.clone(),
            proof_data: artifact.to_base64(),
            proving_time: metadata.proving_time,
            cost: metadata.cost,
            price: metadata.price,
            acceleration: metadata.acceleration.clone(),
            deployment_version: metadata.deployment_version,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    #[must_use]
    pub fn proof_data(&self) -> &str {
        &self.proof_data
    }

    #[must_use]
    pub fn proving_time(&self) -> u64 {
        self.proving_time
    }

    #[must_use]
    pub fn cost(&self) -> u64 {
        self.cost
    }

    #[must_use]
    pub fn price(&self) -> u64 {
        self.price
    }

    #[must_use]
    pub fn acceleration(&self) -> &Acceleration {
        &self.acceleration
    }

    #[must_use]
    pub fn deployment_version(&self) -> u32 {
        self.deployment_version
    }
}

/// Status and raw body of a coordinator response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl CoordinatorResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossy on invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
