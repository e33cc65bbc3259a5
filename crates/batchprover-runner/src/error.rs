//! Error types for the runner crate

use thiserror::Error;

/// Failures to run a process to completion.
///
/// A process that runs and exits non-zero is NOT an error here; callers
/// inspect [`ProcessOutput`](crate::ProcessOutput) for that.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn process '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Process execution failed: {reason}")]
    ExecutionFailed { reason: String },

    #[error("Execution timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },
}
