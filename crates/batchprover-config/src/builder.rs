use std::collections::HashMap;
use std::time::Duration;

use batchprover_utils::error::ConfigError;
use batchprover_utils::types::{Acceleration, ConfigSource};

use crate::{Config, CoordinatorConfig, ProverConfig, SubmissionConfig};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Use this when embedding the workflow in another program and the
    /// operator's environment and config files must not leak in.
    ///
    /// # Example
    ///
    /// ```rust
    /// use batchprover_config::Config;
    /// use batchprover_utils::types::Acceleration;
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .prover_program("/opt/prover/bin/prove")
    ///     .prover_timeout(Duration::from_secs(3600))
    ///     .acceleration(Acceleration::Gpu)
    ///     .cost(100_000)
    ///     .build()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.prover_program(), "/opt/prover/bin/prove");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration.
///
/// All values set via the builder are attributed to
/// `ConfigSource::Programmatic`; everything else keeps its default.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    prover_program: Option<String>,
    prover_timeout: Option<Duration>,
    proving_time: Option<u64>,
    cost: Option<u64>,
    price: Option<u64>,
    acceleration: Option<Acceleration>,
    deployment_version: Option<u32>,
    strict_submit: Option<bool>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the external prover program (path or bare name on `PATH`).
    #[must_use]
    pub fn prover_program(mut self, program: impl Into<String>) -> Self {
        self.prover_program = Some(program.into());
        self
    }

    #[must_use]
    pub fn prover_timeout(mut self, timeout: Duration) -> Self {
        self.prover_timeout = Some(timeout);
        self
    }

    /// Report a fixed proving time (milliseconds) instead of the measured one.
    #[must_use]
    pub fn proving_time(mut self, millis: u64) -> Self {
        self.proving_time = Some(millis);
        self
    }

    /// Cost in hundredths of a currency unit.
    #[must_use]
    pub fn cost(mut self, hundredths: u64) -> Self {
        self.cost = Some(hundredths);
        self
    }

    /// Price in hundredths of a currency unit.
    #[must_use]
    pub fn price(mut self, hundredths: u64) -> Self {
        self.price = Some(hundredths);
        self
    }

    #[must_use]
    pub fn acceleration(mut self, acceleration: Acceleration) -> Self {
        self.acceleration = Some(acceleration);
        self
    }

    #[must_use]
    pub fn deployment_version(mut self, version: u32) -> Self {
        self.deployment_version = Some(version);
        self
    }

    #[must_use]
    pub fn strict_submit(mut self, strict: bool) -> Self {
        self.strict_submit = Some(strict);
        self
    }

    /// Build the configuration, validating the result.
    ///
    /// Durations are truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for timeouts under one second or an
    /// empty prover program.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut source_attribution = HashMap::new();
        let mut track = |key: &str, set: bool| {
            let source = if set {
                ConfigSource::Programmatic
            } else {
                ConfigSource::Default
            };
            source_attribution.insert(key.to_string(), source);
        };

        let defaults = (
            CoordinatorConfig::default(),
            ProverConfig::default(),
            SubmissionConfig::default(),
        );

        track("coordinator.connect_timeout", self.connect_timeout.is_some());
        track("coordinator.request_timeout", self.request_timeout.is_some());
        track("prover.program", self.prover_program.is_some());
        track("prover.timeout", self.prover_timeout.is_some());
        track("submission.proving_time", self.proving_time.is_some());
        track("submission.cost", self.cost.is_some());
        track("submission.price", self.price.is_some());
        track("submission.acceleration", self.acceleration.is_some());
        track("submission.deployment_version", self.deployment_version.is_some());
        track("submission.strict", self.strict_submit.is_some());

        let config = Config {
            coordinator: CoordinatorConfig {
                connect_timeout: self
                    .connect_timeout
                    .map(|d| d.as_secs())
                    .or(defaults.0.connect_timeout),
                request_timeout: self
                    .request_timeout
                    .map(|d| d.as_secs())
                    .or(defaults.0.request_timeout),
            },
            prover: ProverConfig {
                program: self.prover_program.or(defaults.1.program),
                timeout: self.prover_timeout.map(|d| d.as_secs()).or(defaults.1.timeout),
            },
            submission: SubmissionConfig {
                proving_time: self.proving_time.or(defaults.2.proving_time),
                cost: self.cost.or(defaults.2.cost),
                price: self.price.or(defaults.2.price),
                acceleration: self.acceleration.or(defaults.2.acceleration),
                deployment_version: self.deployment_version.or(defaults.2.deployment_version),
                strict: self.strict_submit.or(defaults.2.strict),
            },
            config_path: None,
            source_attribution,
        };

        config.validate()?;
        Ok(config)
    }
}
