//! Exit code constants for batchprover.
//!
//! Most failure exits are fixed constants. Two are mirrored from the
//! collaborator that failed: a rejected batch fetch exits with the
//! coordinator's HTTP status, and a failed prover run exits with the
//! prover's own exit code.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Run completed, submission attempted |
//! | 1 | `USAGE` / `INTERNAL` | Missing CLI argument or internal failure |
//! | HTTP status | - | Coordinator rejected the batch request |
//! | child code | - | Prover exited non-zero |
//! | 69 | `COORDINATOR_UNAVAILABLE` | Coordinator could not be reached |
//! | 70 | `PROVER_LAUNCH` | Prover could not be started |
//! | 75 | `SUBMIT_REJECTED` | Submission rejected (strict mode) |
//! | 76 | `MALFORMED_BATCH` | Batch response was not a valid descriptor |
//! | 78 | `CONFIG` | Invalid configuration |
//! | 124 | `PROVER_TIMEOUT` | Prover exceeded the configured timeout |
//! | 128+N | - | Prover killed by signal N |

/// Exit codes matching the documented exit code table.
///
/// Use the named constants for fixed codes, [`from_http_status`](Self::from_http_status)
/// and [`from_signal`](Self::from_signal) for mirrored codes, and
/// [`as_i32()`](Self::as_i32) to get the value for `std::process::exit()`.
///
/// # Example
///
/// ```rust
/// use batchprover_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::from_http_status(404).as_i32(), 404);
/// assert_eq!(ExitCode::from_signal(9).as_i32(), 137);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - the run completed and the submission was attempted
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Usage error - a required CLI argument is missing or malformed
    pub const USAGE: ExitCode = ExitCode(1);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Coordinator unavailable - no HTTP response was received
    pub const COORDINATOR_UNAVAILABLE: ExitCode = ExitCode(69);

    /// Prover launch failure - the external program could not be spawned
    pub const PROVER_LAUNCH: ExitCode = ExitCode(70);

    /// Submit rejected - non-2xx submit status while strict mode is on
    pub const SUBMIT_REJECTED: ExitCode = ExitCode(75);

    /// Malformed batch - fetch succeeded but the body is not a batch descriptor
    pub const MALFORMED_BATCH: ExitCode = ExitCode(76);

    /// Configuration error - invalid config file, env override or flag value
    pub const CONFIG: ExitCode = ExitCode(78);

    /// Prover timeout - the external program exceeded its configured timeout
    pub const PROVER_TIMEOUT: ExitCode = ExitCode(124);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// Mirror a coordinator HTTP status as the process exit code.
    #[must_use]
    pub const fn from_http_status(status: u16) -> Self {
        ExitCode(status as i32)
    }

    /// Shell convention for a child terminated by signal `signal`.
    #[must_use]
    pub const fn from_signal(signal: i32) -> Self {
        ExitCode(128 + signal)
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
