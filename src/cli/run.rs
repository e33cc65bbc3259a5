//! CLI entry point: parse, configure, run the workflow

use std::ffi::OsString;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{debug, info};

use batchprover_config::Config;
use batchprover_coordinator::{CoordinatorAddress, ParticipantId};
use batchprover_engine::Workflow;
use batchprover_utils::error::BatchProverError;
use batchprover_utils::exit_codes::ExitCode;
use batchprover_utils::logging::init_tracing;

use super::args::Cli;
use super::reporter::ConsoleReporter;

/// Run the CLI against the process arguments.
///
/// Handles ALL output: the run narrative on stdout, logs and errors on
/// stderr. The returned code is what the process should exit with.
///
/// # Errors
///
/// Returns the exit code for the first failure.
pub fn run() -> Result<(), ExitCode> {
    run_with_args(std::env::args_os())
}

/// Same as [`run`] with explicit arguments (the first is the program name).
///
/// # Errors
///
/// Returns the exit code for the first failure.
pub fn run_with_args<I, T>(args: I) -> Result<(), ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(()),
                _ => Err(ExitCode::USAGE),
            };
        }
    };

    let (participant, address) = match resolve_targets(&cli) {
        Ok(targets) => targets,
        Err(err) => return Err(report(&err)),
    };

    // A subscriber may already be installed when embedded in a larger process
    let _ = init_tracing(cli.verbose);

    let config = match Config::discover(&cli.config_args()) {
        Ok(config) => config,
        Err(err) => return Err(report(&err)),
    };

    for (key, (value, source)) in config.effective_config() {
        debug!(%key, %value, %source, "Effective configuration");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start async runtime: {err}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let mut workflow = match Workflow::from_config(&config, participant, address) {
        Ok(workflow) => workflow.with_reporter(ConsoleReporter),
        Err(err) => return Err(report(&err)),
    };

    match runtime.block_on(workflow.run()) {
        Ok(summary) => {
            info!(
                request_id = %summary.request_id,
                submit_status = summary.submit_status,
                proof_bytes = summary.proof_bytes,
                proving_time_ms = summary.proving_time,
                "Run completed"
            );
            Ok(())
        }
        Err(err) => Err(report(&err)),
    }
}

fn resolve_targets(cli: &Cli) -> Result<(ParticipantId, CoordinatorAddress), BatchProverError> {
    let participant = cli.participant_id.as_deref().ok_or_else(|| {
        BatchProverError::Usage(
            "No participant ID specified. Please specify participant ID as first argument."
                .to_string(),
        )
    })?;
    let coordinator = cli.coordinator.as_deref().ok_or_else(|| {
        BatchProverError::Usage(
            "No server address specified. Please specify server address as second argument."
                .to_string(),
        )
    })?;

    let participant =
        ParticipantId::new(participant).map_err(|e| BatchProverError::Usage(e.to_string()))?;
    let address =
        CoordinatorAddress::parse(coordinator).map_err(|e| BatchProverError::Usage(e.to_string()))?;

    Ok((participant, address))
}

fn report(err: &BatchProverError) -> ExitCode {
    eprint!("{}", err.display_for_user());
    err.to_exit_code()
}
