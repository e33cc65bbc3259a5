use crate::error::RunnerError;
use std::time::Duration;

use super::CommandSpec;

/// Output from a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output from the process
    pub stdout: Vec<u8>,
    /// Standard error from the process
    pub stderr: Vec<u8>,
    /// Exit code from the process (None if terminated by signal)
    pub exit_code: Option<i32>,
    /// Terminating signal, Unix only
    pub signal: Option<i32>,
}

impl ProcessOutput {
    /// Output of a process that exited normally with `exit_code`.
    #[must_use]
    pub fn exited(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: i32) -> Self {
        Self {
            stdout,
            stderr,
            exit_code: Some(exit_code),
            signal: None,
        }
    }

    /// Output of a process that was terminated by `signal`.
    #[must_use]
    pub fn signaled(stdout: Vec<u8>, stderr: Vec<u8>, signal: i32) -> Self {
        Self {
            stdout,
            stderr,
            exit_code: None,
            signal: Some(signal),
        }
    }

    /// Get stderr as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Trait for process execution.
///
/// Implementations MUST use argv-style APIs only (no shell string evaluation).
/// The interface is synchronous; the prover stage blocks the calling thread.
///
/// # Example
///
/// ```rust
/// use batchprover_runner::{CommandSpec, ProcessOutput, ProcessRunner, RunnerError};
/// use std::time::Duration;
///
/// struct CannedRunner;
///
/// impl ProcessRunner for CannedRunner {
///     fn run(
///         &self,
///         _cmd: &CommandSpec,
///         _timeout: Option<Duration>,
///     ) -> Result<ProcessOutput, RunnerError> {
///         Ok(ProcessOutput::exited(vec![0xde, 0xad], Vec::new(), 0))
///     }
/// }
///
/// let output = CannedRunner.run(&CommandSpec::new("prover"), None).unwrap();
/// assert_eq!(output.exit_code, Some(0));
/// ```
pub trait ProcessRunner {
    /// Execute a command, optionally bounded by `timeout`.
    ///
    /// # Returns
    ///
    /// * `Ok(ProcessOutput)` - The process completed (possibly with non-zero exit code)
    /// * `Err(RunnerError::Timeout)` - The process timed out and was killed
    /// * `Err(RunnerError::*)` - The process could not be spawned or awaited
    fn run(&self, cmd: &CommandSpec, timeout: Option<Duration>)
    -> Result<ProcessOutput, RunnerError>;
}
