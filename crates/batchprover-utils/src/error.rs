use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `BatchProverError` is returned by every stage of the fetch → compute →
/// submit workflow. Each variant corresponds to one terminal state of a run.
///
/// # Exit Code Mapping
///
/// Use [`to_exit_code()`](Self::to_exit_code) to map errors to CLI exit codes:
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 1 | Usage errors, I/O failures |
/// | HTTP status | `Fetch(Rejected)` |
/// | child code | `Compute(Failed)` |
/// | 69 | `Fetch(Unreachable)`, `Submit(Unreachable)` |
/// | 70 | `Compute(Launch)` |
/// | 75 | `Submit(Rejected)` |
/// | 76 | `Fetch(Malformed)` |
/// | 78 | `Config` |
/// | 124 | `Compute(Timeout)` |
/// | 128+N | `Compute(Signaled)` |
///
/// Library code returns `BatchProverError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum BatchProverError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Batch fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Proof computation error: {0}")]
    Compute(#[from] ComputeError),

    #[error("Proof submission error: {0}")]
    Submit(#[from] SubmitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(msg) => format!("Configuration file is invalid: {msg}"),
            Self::MissingRequired(key) => format!("Required configuration '{key}' is missing"),
            Self::InvalidValue { key, value } => {
                format!("Configuration value for '{key}' is invalid: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Configuration is resolved with precedence: CLI flags > BATCHPROVER_* environment \
             variables > .batchprover/config.toml > built-in defaults."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of the configuration file".to_string(),
                "Valid sections are [coordinator], [prover] and [submission]".to_string(),
            ],
            Self::MissingRequired(key) => vec![format!(
                "Set '{key}' in the configuration file or pass it on the command line"
            )],
            Self::InvalidValue { key, .. } => vec![
                format!("Correct the value of '{key}'"),
                "Run with --help to see accepted values".to_string(),
            ],
            Self::NotFound { .. } => vec![
                "Check the path passed to --config or BATCHPROVER_CONFIG".to_string(),
                "Omit --config to fall back to discovery of .batchprover/config.toml".to_string(),
            ],
        }
    }
}

/// Failures of the batch acquisition stage
#[derive(Error, Debug)]
pub enum FetchError {
    /// The coordinator answered with a non-success status
    #[error("Batch request failed (HTTP status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The coordinator answered 2xx but the body is not a batch descriptor
    #[error("Batch response is malformed: {reason}")]
    Malformed { reason: String, body: String },

    /// No HTTP response was received
    #[error("Coordinator unreachable: {0}")]
    Unreachable(String),
}

impl UserFriendlyError for FetchError {
    fn user_message(&self) -> String {
        match self {
            Self::Rejected { status, body } => {
                format!("Batch request failed (HTTP status {status}): {body}")
            }
            Self::Malformed { reason, body } => {
                format!("Batch response is malformed ({reason}): {body}")
            }
            Self::Unreachable(msg) => format!("Could not reach the coordinator: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Rejected { .. } => Some(
                "The coordinator refused to issue a batch; no proof was computed or submitted."
                    .to_string(),
            ),
            Self::Malformed { .. } => Some(
                "A batch response must be a JSON object with string fields 'request_id' and \
                 'batch_file'."
                    .to_string(),
            ),
            Self::Unreachable(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Rejected { status, .. } if *status == 401 || *status == 403 => vec![
                "Check that the participant ID is registered with the coordinator".to_string(),
            ],
            Self::Rejected { .. } => Vec::new(),
            Self::Malformed { .. } => vec![
                "Check that the coordinator address points at the coordinator API root"
                    .to_string(),
            ],
            Self::Unreachable(_) => vec![
                "Check the coordinator address and your network connection".to_string(),
                "Try running with --verbose to see detailed error information".to_string(),
            ],
        }
    }
}

/// Failures of the proof delegate stage
#[derive(Error, Debug)]
pub enum ComputeError {
    /// The prover exited with a non-zero code
    #[error("Proof computation failed with exit code {code}")]
    Failed { code: i32, stderr: String },

    /// The prover was terminated by a signal
    #[error("Proof computation was terminated by signal {signal}")]
    Signaled { signal: i32, stderr: String },

    /// The prover exceeded the configured timeout and was killed
    #[error("Proof computation timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// The prover could not be started
    #[error("Failed to launch prover '{program}': {reason}")]
    Launch { program: String, reason: String },
}

impl UserFriendlyError for ComputeError {
    fn user_message(&self) -> String {
        match self {
            Self::Failed { stderr, .. } | Self::Signaled { stderr, .. } => format!(
                "Proof computation failed, writing the following to stderr:\n{stderr}"
            ),
            Self::Timeout { timeout_seconds } => {
                format!("Proof computation did not finish within {timeout_seconds} seconds")
            }
            Self::Launch { program, reason } => {
                format!("Could not start prover '{program}': {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Failed { code, .. } => Some(format!("The prover exited with code {code}.")),
            Self::Signaled { signal, .. } => {
                Some(format!("The prover was killed by signal {signal}."))
            }
            Self::Timeout { .. } => Some(
                "The prover was killed; the batch was not submitted and will expire on the \
                 coordinator."
                    .to_string(),
            ),
            Self::Launch { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Failed { .. } | Self::Signaled { .. } => Vec::new(),
            Self::Timeout { .. } => vec![
                "Increase [prover] timeout or pass --prover-timeout".to_string(),
            ],
            Self::Launch { .. } => vec![
                "Check that the prover program exists and is executable".to_string(),
                "Set the program with --prover or [prover] program".to_string(),
            ],
        }
    }
}

/// Failures of the submission stage
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Non-success submit status with strict submit mode enabled
    #[error("Proof submission rejected (HTTP status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// No HTTP response was received
    #[error("Coordinator unreachable: {0}")]
    Unreachable(String),
}

impl UserFriendlyError for SubmitError {
    fn user_message(&self) -> String {
        match self {
            Self::Rejected { status, body } => {
                format!("Proof submission rejected (HTTP status {status}): {body}")
            }
            Self::Unreachable(msg) => {
                format!("Could not reach the coordinator to submit the proof: {msg}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Rejected { .. } => Some(
                "Strict submit mode treats any non-2xx submit status as a failure.".to_string(),
            ),
            Self::Unreachable(_) => Some(
                "The proof was computed but could not be delivered; it is not retained."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Rejected { .. } => vec![
                "Check the submission metadata (deployment_version, acceleration)".to_string(),
            ],
            Self::Unreachable(_) => vec![
                "Check the coordinator address and your network connection".to_string(),
            ],
        }
    }
}

impl UserFriendlyError for BatchProverError {
    fn user_message(&self) -> String {
        match self {
            Self::Usage(msg) => msg.clone(),
            Self::Config(err) => err.user_message(),
            Self::Fetch(err) => err.user_message(),
            Self::Compute(err) => err.user_message(),
            Self::Submit(err) => err.user_message(),
            Self::Io(err) => format!("I/O failure: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Usage(_) | Self::Io(_) => None,
            Self::Config(err) => err.context(),
            Self::Fetch(err) => err.context(),
            Self::Compute(err) => err.context(),
            Self::Submit(err) => err.context(),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Usage(_) => vec!["Run with --help for usage".to_string()],
            Self::Config(err) => err.suggestions(),
            Self::Fetch(err) => err.suggestions(),
            Self::Compute(err) => err.suggestions(),
            Self::Submit(err) => err.suggestions(),
            Self::Io(_) => Vec::new(),
        }
    }
}

// ============================================================================
// BatchProverError methods for exit code mapping
// ============================================================================

impl BatchProverError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// The format is:
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    ///
    /// Coordinator bodies and prover stderr are shown verbatim. Transport
    /// error text is redacted where it is produced.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    ///
    /// This is the single source of truth for CLI exit codes. See the table on
    /// [`BatchProverError`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use batchprover_utils::error::{BatchProverError, FetchError};
    ///
    /// let err = BatchProverError::Fetch(FetchError::Rejected {
    ///     status: 404,
    ///     body: "not found".to_string(),
    /// });
    /// assert_eq!(err.to_exit_code().as_i32(), 404);
    /// ```
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) => ExitCode::USAGE,
            Self::Config(_) => ExitCode::CONFIG,

            Self::Fetch(fetch_err) => match fetch_err {
                FetchError::Rejected { status, .. } => ExitCode::from_http_status(*status),
                FetchError::Malformed { .. } => ExitCode::MALFORMED_BATCH,
                FetchError::Unreachable(_) => ExitCode::COORDINATOR_UNAVAILABLE,
            },

            Self::Compute(compute_err) => match compute_err {
                ComputeError::Failed { code, .. } => ExitCode::from_i32(*code),
                ComputeError::Signaled { signal, .. } => ExitCode::from_signal(*signal),
                ComputeError::Timeout { .. } => ExitCode::PROVER_TIMEOUT,
                ComputeError::Launch { .. } => ExitCode::PROVER_LAUNCH,
            },

            Self::Submit(submit_err) => match submit_err {
                SubmitError::Rejected { .. } => ExitCode::SUBMIT_REJECTED,
                SubmitError::Unreachable(_) => ExitCode::COORDINATOR_UNAVAILABLE,
            },

            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}
