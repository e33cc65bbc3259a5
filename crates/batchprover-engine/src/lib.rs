//! The batchprover workflow
//!
//! Three stages run strictly in order, and the first failure ends the run:
//!
//! 1. [`acquirer`] fetches a batch from the coordinator and validates it
//! 2. [`delegate`] runs the external prover on the batch location
//! 3. [`composer`] builds the submission record and posts it
//!
//! [`Workflow`] drives the stages and tracks the run's [`WorkflowState`].

pub mod acquirer;
pub mod composer;
pub mod delegate;
pub mod reporter;
pub mod workflow;

pub use acquirer::acquire_batch;
pub use composer::{SubmissionSettings, submit_proof};
pub use delegate::{ComputedProof, ProofDelegate};
pub use reporter::{NullReporter, Reporter};
pub use workflow::{RunReport, Workflow, WorkflowState};
