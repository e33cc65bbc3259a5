use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use batchprover_utils::types::{Acceleration, ConfigSource};

/// Prover program used when nothing else is configured.
pub const DEFAULT_PROVER_PROGRAM: &str = "./compute-proof-stub.sh";

/// HTTP connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Deployment version reported with every submission by default.
pub const DEFAULT_DEPLOYMENT_VERSION: u32 = 2;

/// Configuration for a batchprover run.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > `BATCHPROVER_*` environment variables > config file >
/// built-in defaults.
///
/// # Discovery
///
/// Use [`Config::discover()`] for CLI-like behavior that:
/// - Uses `--config` or `BATCHPROVER_CONFIG` when given
/// - Otherwise searches for `.batchprover/config.toml` upward from the
///   current directory
/// - Applies built-in defaults for unspecified values
///
/// # Source Attribution
///
/// Each configuration value tracks its source (`cli`, `env`, `config`,
/// `programmatic`, or `default`) for debugging.
///
/// # Configuration File Format
///
/// ```toml
/// [coordinator]
/// connect_timeout = 30
/// request_timeout = 300
///
/// [prover]
/// program = "./compute-proof-stub.sh"
/// timeout = 7200
///
/// [submission]
/// proving_time = 7200000
/// cost = 100000
/// price = 10100
/// acceleration = "GPU"
/// deployment_version = 2
/// strict = false
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub coordinator: CoordinatorConfig,
    pub prover: ProverConfig,
    pub submission: SubmissionConfig,
    /// Config file the values were loaded from, if any.
    pub config_path: Option<PathBuf>,
    /// Source attribution for each setting, keyed by `section.key`.
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[coordinator]` section: HTTP client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Connect timeout in seconds
    pub connect_timeout: Option<u64>,
    /// Whole-request timeout in seconds; unset means no limit
    pub request_timeout: Option<u64>,
}

/// `[prover]` section: the external proof computation program.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProverConfig {
    pub program: Option<String>,
    /// Timeout in seconds; unset means wait indefinitely
    pub timeout: Option<u64>,
}

/// `[submission]` section: metadata sent with every proof.
///
/// `cost` and `price` are in hundredths of a currency unit.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubmissionConfig {
    /// Reported proving time in milliseconds; unset means measured
    pub proving_time: Option<u64>,
    pub cost: Option<u64>,
    pub price: Option<u64>,
    pub acceleration: Option<Acceleration>,
    pub deployment_version: Option<u32>,
    /// Treat a non-2xx submit status as a failure
    pub strict: Option<bool>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: None,
        }
    }
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            program: Some(DEFAULT_PROVER_PROGRAM.to_string()),
            timeout: None,
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            proving_time: None,
            cost: Some(0),
            price: Some(0),
            acceleration: Some(Acceleration::None),
            deployment_version: Some(DEFAULT_DEPLOYMENT_VERSION),
            strict: Some(false),
        }
    }
}

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub(crate) coordinator: Option<CoordinatorConfig>,
    pub(crate) prover: Option<ProverConfig>,
    pub(crate) submission: Option<SubmissionConfig>,
}
