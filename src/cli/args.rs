//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use batchprover_config::CliArgs;
use batchprover_utils::types::Acceleration;

/// batchprover - fetch a proving batch, run the prover, submit the proof
#[derive(Parser, Debug)]
#[command(name = "batchprover")]
#[command(about = "Fetch a proving batch from a coordinator, run an external prover, and submit the proof")]
#[command(long_about = r#"
batchprover performs one stateless attempt at the coordinator protocol:

  1. GET  {COORDINATOR}/get_batch/?participant_id={PARTICIPANT_ID}
  2. run  <prover> {COORDINATOR}/{batch_file}
  3. POST {COORDINATOR}/submit_proof/?participant_id={PARTICIPANT_ID}

EXAMPLES:
  # Prove one batch with the default prover (./compute-proof-stub.sh)
  batchprover alice http://localhost:8080

  # Use a specific prover with a two hour limit and report GPU acceleration
  batchprover alice https://coord.example.com --prover /opt/prover/bin/prove \
      --prover-timeout 7200 --acceleration GPU

CONFIGURATION:
  Precedence: CLI flags > BATCHPROVER_* environment > config file > defaults
  The config file is discovered by searching upward from CWD for
  .batchprover/config.toml, or given with --config / BATCHPROVER_CONFIG.

EXIT STATUS:
  0 success, 1 usage error, HTTP status if the batch request is rejected,
  the prover's exit code if it fails, 69 coordinator unreachable,
  70 prover not launchable, 75 submission rejected (--strict-submit),
  76 malformed batch, 78 invalid configuration, 124 prover timeout,
  128+N prover killed by signal N.
"#)]
#[command(version)]
pub struct Cli {
    /// Participant identity used for both the batch request and the submission
    #[arg(value_name = "PARTICIPANT_ID")]
    pub participant_id: Option<String>,

    /// Coordinator base address, e.g. http://localhost:8080
    #[arg(value_name = "COORDINATOR")]
    pub coordinator: Option<String>,

    /// Path to configuration file (overrides discovery)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// External prover program
    #[arg(long, value_name = "PROGRAM")]
    pub prover: Option<String>,

    /// Kill the prover after this many seconds
    #[arg(long, value_name = "SECS")]
    pub prover_timeout: Option<u64>,

    /// HTTP connect timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,

    /// HTTP whole-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Reported proving time in milliseconds (default: measured)
    #[arg(long, value_name = "MS")]
    pub proving_time: Option<u64>,

    /// Reported cost in hundredths of a currency unit
    #[arg(long, value_name = "HUNDREDTHS")]
    pub cost: Option<u64>,

    /// Reported price in hundredths of a currency unit
    #[arg(long, value_name = "HUNDREDTHS")]
    pub price: Option<u64>,

    /// Hardware acceleration class: GPU, FPGA, ASIC, NONE, or another label
    #[arg(long, value_name = "CLASS")]
    pub acceleration: Option<Acceleration>,

    /// Deployment version reported with the submission
    #[arg(long, value_name = "N")]
    pub deployment_version: Option<u32>,

    /// Fail with exit 75 when the submission is not accepted with a 2xx status
    #[arg(long)]
    pub strict_submit: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Configuration overrides carried by the flags.
    #[must_use]
    pub fn config_args(&self) -> CliArgs {
        CliArgs {
            config_path: self.config.clone(),
            prover_program: self.prover.clone(),
            prover_timeout: self.prover_timeout,
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            proving_time: self.proving_time,
            cost: self.cost,
            price: self.price,
            acceleration: self.acceleration.clone(),
            deployment_version: self.deployment_version,
            strict_submit: self.strict_submit,
        }
    }
}

/// Build the clap command, e.g. for completion generation.
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
