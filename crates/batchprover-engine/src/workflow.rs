//! The fetch → compute → submit state machine.

use std::fmt;
use tracing::Instrument;

use batchprover_config::Config;
use batchprover_coordinator::{
    Coordinator, CoordinatorAddress, HttpCoordinator, ParticipantId, SubmissionRecord,
};
use batchprover_runner::{NativeRunner, ProcessRunner};
use batchprover_utils::error::{BatchProverError, ConfigError};
use batchprover_utils::logging::{Stage, StageTimer, stage_span};

use crate::acquirer::acquire_batch;
use crate::composer::{SubmissionSettings, submit_proof};
use crate::delegate::ProofDelegate;
use crate::reporter::{NullReporter, Reporter};

/// Where a run is, or where it ended.
///
/// `Start → {Fetching | ConfigFailed}`, then `Fetching → {Computing | FetchFailed}
/// → {Submitting | ComputeFailed} → {Done | SubmitFailed}`. There are no
/// backward edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    Fetching,
    Computing,
    Submitting,
    Done,
    ConfigFailed,
    FetchFailed,
    ComputeFailed,
    SubmitFailed,
}

impl WorkflowState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Done
                | Self::ConfigFailed
                | Self::FetchFailed
                | Self::ComputeFailed
                | Self::SubmitFailed
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Start => "start",
            Self::Fetching => "fetching",
            Self::Computing => "computing",
            Self::Submitting => "submitting",
            Self::Done => "done",
            Self::ConfigFailed => "config_failed",
            Self::FetchFailed => "fetch_failed",
            Self::ComputeFailed => "compute_failed",
            Self::SubmitFailed => "submit_failed",
        };
        f.write_str(label)
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub request_id: String,
    pub batch_location: String,
    pub proof_bytes: usize,
    /// Proving time reported to the coordinator, in milliseconds
    pub proving_time: u64,
    pub submit_status: u16,
    pub submit_body: String,
}

/// One stateless attempt at fetching, proving, and submitting a batch.
pub struct Workflow<C, R> {
    coordinator: C,
    delegate: ProofDelegate<R>,
    participant: ParticipantId,
    submission: SubmissionSettings,
    reporter: Box<dyn Reporter>,
    state: WorkflowState,
}

impl Workflow<HttpCoordinator, NativeRunner> {
    /// Build the production workflow: HTTP coordinator, native prover runner.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the HTTP client cannot be built.
    pub fn from_config(
        config: &Config,
        participant: ParticipantId,
        address: CoordinatorAddress,
    ) -> Result<Self, BatchProverError> {
        let coordinator =
            HttpCoordinator::new(address, config.connect_timeout(), config.request_timeout())
                .map_err(|e| ConfigError::InvalidValue {
                    key: "coordinator".to_string(),
                    value: e.to_string(),
                })?;
        let delegate = ProofDelegate::native(config.prover_program(), config.prover_timeout());

        Ok(Self::new(
            coordinator,
            delegate,
            participant,
            SubmissionSettings::from_config(config),
        ))
    }
}

impl<C, R> Workflow<C, R>
where
    C: Coordinator,
    R: ProcessRunner,
{
    #[must_use]
    pub fn new(
        coordinator: C,
        delegate: ProofDelegate<R>,
        participant: ParticipantId,
        submission: SubmissionSettings,
    ) -> Self {
        Self {
            coordinator,
            delegate,
            participant,
            submission,
            reporter: Box::new(NullReporter),
            state: WorkflowState::Start,
        }
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Run the workflow to a terminal state.
    ///
    /// The prover program is checked before the batch is requested. Each
    /// stage runs only if the previous one succeeded, and the submission
    /// always carries the `request_id` of the batch fetched in this run.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; see [`BatchProverError::to_exit_code`]
    /// for how each maps to an exit status.
    pub async fn run(&mut self) -> Result<RunReport, BatchProverError> {
        if let Err(err) = self.delegate.preflight() {
            self.state = WorkflowState::ConfigFailed;
            return Err(err.into());
        }

        // Fetch
        self.state = WorkflowState::Fetching;
        let timer = StageTimer::start(Stage::Fetch);
        let fetched = acquire_batch(&self.coordinator, &self.participant, self.reporter.as_ref())
            .instrument(stage_span(Stage::Fetch, self.participant.as_str()))
            .await;
        let batch = match fetched {
            Ok(batch) => {
                timer.complete();
                batch
            }
            Err(e) => {
                timer.fail(&e);
                self.state = WorkflowState::FetchFailed;
                return Err(e.into());
            }
        };

        // Compute
        self.state = WorkflowState::Computing;
        let location = batch.resolve_location(self.coordinator.address());
        self.reporter.compute_started(&location);
        let timer = StageTimer::start(Stage::Compute);
        let computed = stage_span(Stage::Compute, self.participant.as_str())
            .in_scope(|| self.delegate.compute(&location));
        let proof = match computed {
            Ok(proof) => {
                timer.complete();
                proof
            }
            Err(e) => {
                timer.fail(&e);
                self.state = WorkflowState::ComputeFailed;
                return Err(e.into());
            }
        };

        // Submit
        self.state = WorkflowState::Submitting;
        let metadata = self.submission.metadata(proof.elapsed);
        let record = SubmissionRecord::compose(&batch, &proof.artifact, &metadata);
        let timer = StageTimer::start(Stage::Submit);
        let submitted = submit_proof(
            &self.coordinator,
            &self.participant,
            &record,
            self.submission.strict,
            self.reporter.as_ref(),
        )
        .instrument(stage_span(Stage::Submit, self.participant.as_str()))
        .await;
        let response = match submitted {
            Ok(response) => {
                timer.complete();
                response
            }
            Err(e) => {
                timer.fail(&e);
                self.state = WorkflowState::SubmitFailed;
                return Err(e.into());
            }
        };

        self.state = WorkflowState::Done;
        Ok(RunReport {
            request_id: record.request_id().to_string(),
            batch_location: location,
            proof_bytes: proof.artifact.len(),
            proving_time: record.proving_time(),
            submit_status: response.status,
            submit_body: response.body_text(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use batchprover_coordinator::{CoordinatorError, CoordinatorResponse};
    use batchprover_runner::{CommandSpec, ProcessOutput, RunnerError};
    use batchprover_utils::types::Acceleration;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct Calls {
        fetches: Vec<String>,
        submissions: Vec<(String, SubmissionRecord)>,
    }

    struct MockCoordinator {
        address: CoordinatorAddress,
        fetch: Option<CoordinatorResponse>,
        submit: Option<CoordinatorResponse>,
        calls: Arc<Mutex<Calls>>,
    }

    impl MockCoordinator {
        fn new(fetch: Option<CoordinatorResponse>, submit: Option<CoordinatorResponse>) -> Self {
            Self {
                address: CoordinatorAddress::parse("http://coord.test").unwrap(),
                fetch,
                submit,
                calls: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl Coordinator for MockCoordinator {
        fn address(&self) -> &CoordinatorAddress {
            &self.address
        }

        async fn fetch_batch(
            &self,
            participant: &ParticipantId,
        ) -> Result<CoordinatorResponse, CoordinatorError> {
            self.calls
                .lock()
                .unwrap()
                .fetches
                .push(participant.to_string());
            self.fetch
                .clone()
                .ok_or_else(|| CoordinatorError::Transport("connection refused".to_string()))
        }

        async fn submit_proof(
            &self,
            participant: &ParticipantId,
            record: &SubmissionRecord,
        ) -> Result<CoordinatorResponse, CoordinatorError> {
            self.calls
                .lock()
                .unwrap()
                .submissions
                .push((participant.to_string(), record.clone()));
            self.submit
                .clone()
                .ok_or_else(|| CoordinatorError::Transport("connection reset".to_string()))
        }
    }

    #[derive(Clone)]
    struct MockRunner {
        output: ProcessOutput,
        invocations: Rc<RefCell<Vec<Vec<String>>>>,
    }

    impl MockRunner {
        fn new(output: ProcessOutput) -> Self {
            Self {
                output,
                invocations: Rc::default(),
            }
        }
    }

    impl ProcessRunner for MockRunner {
        fn run(
            &self,
            cmd: &CommandSpec,
            _timeout: Option<Duration>,
        ) -> Result<ProcessOutput, RunnerError> {
            self.invocations.borrow_mut().push(
                cmd.args
                    .iter()
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect(),
            );
            Ok(self.output.clone())
        }
    }

    /// A prover program that always passes preflight.
    fn existing_program() -> String {
        std::env::current_exe().unwrap().display().to_string()
    }

    fn workflow(
        coordinator: MockCoordinator,
        runner: MockRunner,
        settings: SubmissionSettings,
    ) -> Workflow<MockCoordinator, MockRunner> {
        Workflow::new(
            coordinator,
            ProofDelegate::new(runner, existing_program(), None),
            ParticipantId::new("alice").unwrap(),
            settings,
        )
    }

    fn batch_ok() -> Option<CoordinatorResponse> {
        Some(CoordinatorResponse::new(
            200,
            r#"{"request_id":"r1","batch_file":"b1.bin"}"#,
        ))
    }

    #[tokio::test]
    async fn test_happy_path_submits_fetched_request_id() {
        let coordinator =
            MockCoordinator::new(batch_ok(), Some(CoordinatorResponse::new(200, "ok")));
        let calls = Arc::clone(&coordinator.calls);
        let runner =
            MockRunner::new(ProcessOutput::exited(vec![0xde, 0xad, 0xbe, 0xef], Vec::new(), 0));
        let invocations = Rc::clone(&runner.invocations);
        let settings = SubmissionSettings {
            proving_time: Some(7_200_000),
            cost: 100_000,
            price: 10_100,
            acceleration: Acceleration::Gpu,
            deployment_version: 2,
            strict: false,
        };

        let mut wf = workflow(coordinator, runner, settings);
        let report = wf.run().await.unwrap();

        assert_eq!(wf.state(), WorkflowState::Done);
        assert_eq!(report.request_id, "r1");
        assert_eq!(report.batch_location, "http://coord.test/b1.bin");
        assert_eq!(report.submit_status, 200);
        assert_eq!(*invocations.borrow(), vec![vec!["http://coord.test/b1.bin".to_string()]]);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.fetches, vec!["alice"]);
        assert_eq!(calls.submissions.len(), 1);
        let (participant, record) = &calls.submissions[0];
        assert_eq!(participant, "alice");
        assert_eq!(record.request_id(), "r1");
        assert_eq!(record.proof_data(), "3q2+7w==");
        assert_eq!(BASE64.decode(record.proof_data()).unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(record.proving_time(), 7_200_000);
        assert_eq!(record.acceleration(), &Acceleration::Gpu);
    }

    #[tokio::test]
    async fn test_rejected_fetch_never_runs_prover() {
        let coordinator =
            MockCoordinator::new(Some(CoordinatorResponse::new(404, "not found")), None);
        let calls = Arc::clone(&coordinator.calls);
        let runner = MockRunner::new(ProcessOutput::exited(Vec::new(), Vec::new(), 0));
        let invocations = Rc::clone(&runner.invocations);

        let mut wf = workflow(coordinator, runner, SubmissionSettings::default());
        let err = wf.run().await.unwrap_err();

        assert_eq!(wf.state(), WorkflowState::FetchFailed);
        assert_eq!(err.to_exit_code().as_i32(), 404);
        assert!(err.display_for_user().contains("not found"));
        assert!(invocations.borrow().is_empty());
        assert!(calls.lock().unwrap().submissions.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_batch_exit_code() {
        let coordinator = MockCoordinator::new(
            Some(CoordinatorResponse::new(200, r#"{"batch_file":"b1.bin"}"#)),
            None,
        );
        let runner = MockRunner::new(ProcessOutput::exited(Vec::new(), Vec::new(), 0));

        let mut wf = workflow(coordinator, runner, SubmissionSettings::default());
        let err = wf.run().await.unwrap_err();

        assert_eq!(wf.state(), WorkflowState::FetchFailed);
        assert_eq!(err.to_exit_code().as_i32(), 76);
    }

    #[tokio::test]
    async fn test_unreachable_coordinator_exit_code() {
        let coordinator = MockCoordinator::new(None, None);
        let runner = MockRunner::new(ProcessOutput::exited(Vec::new(), Vec::new(), 0));

        let mut wf = workflow(coordinator, runner, SubmissionSettings::default());
        let err = wf.run().await.unwrap_err();

        assert_eq!(err.to_exit_code().as_i32(), 69);
    }

    #[tokio::test]
    async fn test_failed_prover_never_submits() {
        let coordinator = MockCoordinator::new(batch_ok(), Some(CoordinatorResponse::new(200, "")));
        let calls = Arc::clone(&coordinator.calls);
        let runner = MockRunner::new(ProcessOutput::exited(
            Vec::new(),
            b"missing key\n".to_vec(),
            2,
        ));

        let mut wf = workflow(coordinator, runner, SubmissionSettings::default());
        let err = wf.run().await.unwrap_err();

        assert_eq!(wf.state(), WorkflowState::ComputeFailed);
        assert_eq!(err.to_exit_code().as_i32(), 2);
        assert!(err.display_for_user().contains("missing key"));
        assert!(calls.lock().unwrap().submissions.is_empty());
    }

    #[tokio::test]
    async fn test_lenient_submit_accepts_any_status() {
        let coordinator = MockCoordinator::new(
            batch_ok(),
            Some(CoordinatorResponse::new(422, "bad proof")),
        );
        let runner = MockRunner::new(ProcessOutput::exited(vec![1], Vec::new(), 0));

        let mut wf = workflow(coordinator, runner, SubmissionSettings::default());
        let report = wf.run().await.unwrap();

        assert_eq!(wf.state(), WorkflowState::Done);
        assert_eq!(report.submit_status, 422);
        assert_eq!(report.submit_body, "bad proof");
    }

    #[tokio::test]
    async fn test_strict_submit_rejects_non_success() {
        let coordinator = MockCoordinator::new(
            batch_ok(),
            Some(CoordinatorResponse::new(422, "bad proof")),
        );
        let runner = MockRunner::new(ProcessOutput::exited(vec![1], Vec::new(), 0));
        let settings = SubmissionSettings {
            strict: true,
            ..SubmissionSettings::default()
        };

        let mut wf = workflow(coordinator, runner, settings);
        let err = wf.run().await.unwrap_err();

        assert_eq!(wf.state(), WorkflowState::SubmitFailed);
        assert_eq!(err.to_exit_code().as_i32(), 75);
    }

    #[tokio::test]
    async fn test_submit_transport_failure() {
        let coordinator = MockCoordinator::new(batch_ok(), None);
        let runner = MockRunner::new(ProcessOutput::exited(vec![1], Vec::new(), 0));

        let mut wf = workflow(coordinator, runner, SubmissionSettings::default());
        let err = wf.run().await.unwrap_err();

        assert_eq!(wf.state(), WorkflowState::SubmitFailed);
        assert_eq!(err.to_exit_code().as_i32(), 69);
    }

    #[tokio::test]
    async fn test_preflight_failure_fetches_nothing() {
        let coordinator = MockCoordinator::new(batch_ok(), None);
        let calls = Arc::clone(&coordinator.calls);
        let runner = MockRunner::new(ProcessOutput::exited(Vec::new(), Vec::new(), 0));

        let mut wf = Workflow::new(
            coordinator,
            ProofDelegate::new(runner, "/nonexistent/prover", None),
            ParticipantId::new("alice").unwrap(),
            SubmissionSettings::default(),
        );
        let err = wf.run().await.unwrap_err();

        assert_eq!(wf.state(), WorkflowState::ConfigFailed);
        assert!(wf.state().is_terminal());
        assert_eq!(err.to_exit_code().as_i32(), 78);
        assert!(calls.lock().unwrap().fetches.is_empty());
    }

    #[test]
    fn test_terminal_states() {
        assert!(WorkflowState::Done.is_terminal());
        assert!(WorkflowState::SubmitFailed.is_terminal());
        assert!(WorkflowState::ConfigFailed.is_terminal());
        assert!(!WorkflowState::Start.is_terminal());
        assert!(!WorkflowState::Computing.is_terminal());
        assert_eq!(WorkflowState::FetchFailed.to_string(), "fetch_failed");
    }
}
