//! batchprover - participant client for a batch-proving coordinator
//!
//! One invocation performs a single stateless attempt:
//!
//! 1. request a batch descriptor with `GET {base}/get_batch/?participant_id={id}`
//! 2. run the external prover on `{base}/{batch_file}` and capture its stdout
//! 3. post the base64 proof and metadata to `{base}/submit_proof/?participant_id={id}`
//!
//! Failures at each stage map to distinct exit codes; see [`ExitCode`].
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! batchprover alice http://localhost:8080 --prover ./compute-proof-stub.sh
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use batchprover::{Config, CliArgs, CoordinatorAddress, ParticipantId, Workflow};
//!
//! # async fn demo() -> Result<(), batchprover::BatchProverError> {
//! let config = Config::discover(&CliArgs::default())?;
//! let participant = ParticipantId::new("alice").expect("non-empty");
//! let address = CoordinatorAddress::parse("http://localhost:8080").expect("valid address");
//!
//! let report = Workflow::from_config(&config, participant, address)?.run().await?;
//! println!("submitted {} -> HTTP {}", report.request_id, report.submit_status);
//! # Ok(())
//! # }
//! ```
//!
//! # Crates
//!
//! - `batchprover-utils`: errors, exit codes, logging, redaction
//! - `batchprover-config`: layered configuration
//! - `batchprover-runner`: child process execution
//! - `batchprover-coordinator`: wire types and HTTP transport
//! - `batchprover-engine`: the fetch, compute, submit workflow

pub mod cli;

pub use batchprover_config::{CliArgs, Config, ConfigBuilder};
pub use batchprover_coordinator::{
    BatchDescriptor, Coordinator, CoordinatorAddress, CoordinatorResponse, HttpCoordinator,
    ParticipantId, ProofArtifact, SubmissionMetadata, SubmissionRecord,
};
pub use batchprover_engine::{
    ComputedProof, NullReporter, ProofDelegate, Reporter, RunReport, SubmissionSettings, Workflow,
    WorkflowState,
};
pub use batchprover_runner::{CommandSpec, NativeRunner, ProcessOutput, ProcessRunner};
pub use batchprover_utils::error::{
    BatchProverError, ComputeError, ConfigError, FetchError, SubmitError, UserFriendlyError,
};
pub use batchprover_utils::exit_codes::ExitCode;
pub use batchprover_utils::types::Acceleration;
