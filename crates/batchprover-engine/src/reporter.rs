//! Operator-facing progress output.
//!
//! Diagnostics go through `tracing`; the narrative an operator reads on a
//! successful run goes through a [`Reporter`]. All methods default to no-ops.

use batchprover_coordinator::CoordinatorResponse;

pub trait Reporter {
    /// Before the batch request is sent.
    fn fetch_started(&self) {}

    /// A batch response was accepted. Receives the raw response.
    fn batch_received(&self, _response: &CoordinatorResponse) {}

    /// Before the prover is launched on `location`.
    fn compute_started(&self, _location: &str) {}

    /// Before the proof is submitted.
    fn submit_started(&self) {}

    /// Any submit response, success or not.
    fn submit_response(&self, _response: &CoordinatorResponse) {}
}

/// Reporter that prints nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}
