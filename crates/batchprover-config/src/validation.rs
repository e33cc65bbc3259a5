use batchprover_utils::error::ConfigError;

use crate::Config;

fn require_positive(key: &str, value: Option<u64>) -> Result<(), ConfigError> {
    match value {
        Some(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: "must be at least 1 second".to_string(),
        }),
        _ => Ok(()),
    }
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_positive("coordinator.connect_timeout", self.coordinator.connect_timeout)?;
        require_positive("coordinator.request_timeout", self.coordinator.request_timeout)?;
        require_positive("prover.timeout", self.prover.timeout)?;

        match self.prover.program.as_deref() {
            None => {
                return Err(ConfigError::MissingRequired("prover.program".to_string()));
            }
            Some(program) if program.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    key: "prover.program".to_string(),
                    value: "must not be empty".to_string(),
                });
            }
            Some(_) => {}
        }

        if self.submission.deployment_version.is_none() {
            return Err(ConfigError::MissingRequired(
                "submission.deployment_version".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::builder().build().is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = Config::builder().build().unwrap();
        config.prover.timeout = Some(0);
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "prover.timeout"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }

        let mut config = Config::builder().build().unwrap();
        config.coordinator.connect_timeout = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_program_rejected() {
        let mut config = Config::builder().build().unwrap();
        config.prover.program = Some("   ".to_string());
        match config.validate() {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "prover.program"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
