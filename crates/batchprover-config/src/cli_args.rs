use std::path::PathBuf;

use batchprover_utils::types::Acceleration;

/// Configuration overrides collected from command-line flags.
///
/// `None` (or `false` for switches) means the flag was not given and the
/// value falls through to the environment, file, or default layer.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub prover_program: Option<String>,
    pub prover_timeout: Option<u64>,
    pub connect_timeout: Option<u64>,
    pub request_timeout: Option<u64>,
    pub proving_time: Option<u64>,
    pub cost: Option<u64>,
    pub price: Option<u64>,
    pub acceleration: Option<Acceleration>,
    pub deployment_version: Option<u32>,
    pub strict_submit: bool,
}
