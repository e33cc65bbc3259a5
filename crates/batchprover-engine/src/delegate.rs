//! Proof delegation: run the external prover on a batch location.

use std::path::{MAIN_SEPARATOR, Path};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use batchprover_coordinator::ProofArtifact;
use batchprover_runner::{CommandSpec, NativeRunner, ProcessRunner, RunnerError};
use batchprover_utils::error::{ComputeError, ConfigError};

/// A successful prover run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedProof {
    pub artifact: ProofArtifact,
    /// Wall-clock duration of the prover run
    pub elapsed: Duration,
}

/// Invokes `program <batch location>` through a [`ProcessRunner`].
///
/// The prover gets no stdin. Its stdout becomes the proof artifact on exit 0;
/// otherwise its stderr is carried in the error.
#[derive(Debug, Clone)]
pub struct ProofDelegate<R> {
    runner: R,
    program: String,
    timeout: Option<Duration>,
}

impl ProofDelegate<NativeRunner> {
    #[must_use]
    pub fn native(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self::new(NativeRunner::new(), program, timeout)
    }
}

impl<R: ProcessRunner> ProofDelegate<R> {
    #[must_use]
    pub fn new(runner: R, program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check that the prover program can be found.
    ///
    /// Programs containing a path separator must exist as a file; bare names
    /// are looked up on `PATH`. Run before fetching so a misconfigured client
    /// never consumes a batch.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for `prover.program`.
    pub fn preflight(&self) -> Result<(), ConfigError> {
        let is_path = self.program.contains('/') || self.program.contains(MAIN_SEPARATOR);

        let found = if is_path {
            Path::new(&self.program).is_file()
        } else {
            which::which(&self.program).is_ok()
        };

        if found {
            debug!(program = %self.program, "Prover program found");
            Ok(())
        } else {
            Err(ConfigError::InvalidValue {
                key: "prover.program".to_string(),
                value: if is_path {
                    format!("'{}' does not exist", self.program)
                } else {
                    format!("'{}' was not found on PATH", self.program)
                },
            })
        }
    }

    /// Run the prover on `location` and capture its proof.
    ///
    /// # Errors
    ///
    /// - `ComputeError::Failed` for a non-zero exit, with the prover's stderr
    /// - `ComputeError::Signaled` when the prover was killed by a signal
    /// - `ComputeError::Timeout` when the configured timeout elapsed
    /// - `ComputeError::Launch` when the prover could not be run at all
    pub fn compute(&self, location: &str) -> Result<ComputedProof, ComputeError> {
        let cmd = CommandSpec::new(&self.program).arg(location);

        let started = Instant::now();
        let output = self
            .runner
            .run(&cmd, self.timeout)
            .map_err(|e| self.map_runner_error(e))?;
        let elapsed = started.elapsed();

        match (output.exit_code, output.signal) {
            (Some(0), _) => {
                debug!(
                    bytes = output.stdout.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Prover succeeded"
                );
                Ok(ComputedProof {
                    artifact: ProofArtifact::new(output.stdout),
                    elapsed,
                })
            }
            (Some(code), _) => {
                warn!(code, "Prover exited with failure");
                Err(ComputeError::Failed {
                    code,
                    stderr: output.stderr_string(),
                })
            }
            (None, Some(signal)) => {
                warn!(signal, "Prover terminated by signal");
                Err(ComputeError::Signaled {
                    signal,
                    stderr: output.stderr_string(),
                })
            }
            (None, None) => Err(ComputeError::Launch {
                program: self.program.clone(),
                reason: "process ended without an exit status".to_string(),
            }),
        }
    }

    fn map_runner_error(&self, error: RunnerError) -> ComputeError {
        match error {
            RunnerError::Timeout { timeout_seconds } => ComputeError::Timeout { timeout_seconds },
            RunnerError::SpawnFailed { reason, .. } | RunnerError::ExecutionFailed { reason } => {
                ComputeError::Launch {
                    program: self.program.clone(),
                    reason,
                }
            }
        }
    }
}
