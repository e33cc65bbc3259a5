//! Logging and observability for batchprover
//!
//! Diagnostics are emitted through `tracing` to stderr. Stdout is reserved
//! for operator output (the run narrative and verbatim coordinator bodies).

use std::fmt;
use std::time::{Duration, Instant};
use tracing::{Level, error, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self as fmt_layer, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::redaction::redact_error_message;

/// Pipeline stage names used as the `stage` field on spans and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Compute,
    Submit,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Compute => "compute",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter directive used when `RUST_LOG` is not set.
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "batchprover=debug,warn"
    } else {
        "batchprover=info,warn"
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence when set. Verbose mode adds targets and
/// span-close events (which carry span timing). Output always goes to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt_layer::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt_layer::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Create the span a stage runs inside.
pub fn stage_span(stage: Stage, participant_id: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "stage",
        stage = %stage,
        participant_id = %participant_id,
    )
}

pub fn log_stage_start(stage: Stage) {
    info!(stage = %stage, "Stage started");
}

pub fn log_stage_complete(stage: Stage, duration_ms: u128) {
    info!(stage = %stage, duration_ms = %duration_ms, "Stage completed");
}

/// Log a stage failure. The error text is redacted before it is recorded.
pub fn log_stage_error(stage: Stage, error: &str, duration_ms: u128) {
    let sanitized = redact_error_message(error);
    error!(
        stage = %stage,
        duration_ms = %duration_ms,
        error = %sanitized,
        "Stage failed"
    );
}

/// Wall-clock timer for one stage.
///
/// Logs the start on creation; call [`complete`](Self::complete) or
/// [`fail`](Self::fail) to log the outcome with `duration_ms`.
#[derive(Debug)]
pub struct StageTimer {
    stage: Stage,
    started: Instant,
}

impl StageTimer {
    #[must_use]
    pub fn start(stage: Stage) -> Self {
        log_stage_start(stage);
        Self {
            stage,
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn complete(self) -> Duration {
        let elapsed = self.elapsed();
        log_stage_complete(self.stage, elapsed.as_millis());
        elapsed
    }

    pub fn fail(self, error: &dyn fmt::Display) -> Duration {
        let elapsed = self.elapsed();
        log_stage_error(self.stage, &error.to_string(), elapsed.as_millis());
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Fetch.as_str(), "fetch");
        assert_eq!(Stage::Compute.to_string(), "compute");
        assert_eq!(Stage::Submit.as_str(), "submit");
    }

    #[test]
    fn test_default_filter() {
        assert!(default_filter(true).contains("batchprover=debug"));
        assert!(default_filter(false).contains("batchprover=info"));
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
        assert!(EnvFilter::try_new(default_filter(false)).is_ok());
    }

    #[test]
    fn test_stage_timer_measures_elapsed() {
        let timer = StageTimer::start(Stage::Compute);
        thread::sleep(Duration::from_millis(10));
        let elapsed = timer.complete();
        assert!(elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn test_stage_span_without_subscriber() {
        // Spans are disabled without a subscriber; entering one must not panic.
        let span = stage_span(Stage::Fetch, "alice");
        let _guard = span.enter();
        log_stage_error(Stage::Fetch, "http://h/?participant_id=alice", 1);
    }
}
