//! Coordinator protocol for batchprover
//!
//! Wire and domain types for the batch fetch and proof submission calls, and
//! the [`Coordinator`] trait with its HTTP implementation. Status codes are
//! returned to the caller uninterpreted; deciding what a status means for the
//! run is the workflow's job.

pub mod client;
pub mod error;
mod http_client;
pub mod types;

pub use client::{Coordinator, HttpCoordinator};
pub use error::{CoordinatorError, MalformedBatch};
pub use types::{
    BatchDescriptor, CoordinatorAddress, CoordinatorResponse, ParticipantId, ProofArtifact,
    SubmissionMetadata, SubmissionRecord,
};
