//! Configuration management for batchprover
//!
//! This crate provides hierarchical configuration with discovery and precedence:
//! CLI > environment > file > defaults. Configuration files are TOML with
//! `[coordinator]`, `[prover]`, and `[submission]` sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use discovery::{
    CONFIG_PATH_ENV, ENV_ACCELERATION, ENV_COST, ENV_DEPLOYMENT_VERSION, ENV_PRICE, ENV_PROVER,
    ENV_PROVER_TIMEOUT, ENV_PROVING_TIME, ENV_STRICT_SUBMIT,
};
pub use model::*;
pub use batchprover_utils::types::{Acceleration, ConfigSource};

use std::time::Duration;

impl Config {
    /// The prover program. Validation guarantees it is set and non-empty.
    #[must_use]
    pub fn prover_program(&self) -> &str {
        self.prover.program.as_deref().unwrap_or(DEFAULT_PROVER_PROGRAM)
    }

    #[must_use]
    pub fn prover_timeout(&self) -> Option<Duration> {
        self.prover.timeout.map(Duration::from_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.coordinator
                .connect_timeout
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.coordinator.request_timeout.map(Duration::from_secs)
    }

    /// Fixed proving time in milliseconds, or `None` to report the measured time.
    #[must_use]
    pub fn proving_time_override(&self) -> Option<u64> {
        self.submission.proving_time
    }

    #[must_use]
    pub fn cost(&self) -> u64 {
        self.submission.cost.unwrap_or(0)
    }

    #[must_use]
    pub fn price(&self) -> u64 {
        self.submission.price.unwrap_or(0)
    }

    #[must_use]
    pub fn acceleration(&self) -> Acceleration {
        self.submission.acceleration.clone().unwrap_or_default()
    }

    #[must_use]
    pub fn deployment_version(&self) -> u32 {
        self.submission
            .deployment_version
            .unwrap_or(DEFAULT_DEPLOYMENT_VERSION)
    }

    #[must_use]
    pub fn strict_submit(&self) -> bool {
        self.submission.strict.unwrap_or(false)
    }
}
