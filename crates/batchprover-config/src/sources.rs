use std::collections::BTreeMap;

use batchprover_utils::types::ConfigSource;

use crate::Config;

impl Config {
    /// Source of one setting, `default` when untracked.
    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }

    /// Get effective configuration as key-value pairs with source attribution.
    ///
    /// Unset optional values are omitted.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add_config = |key: &str, value: Option<String>| {
            if let Some(val) = value {
                config.insert(key.to_string(), (val, self.source_of(key).to_string()));
            }
        };

        add_config(
            "coordinator.connect_timeout",
            self.coordinator.connect_timeout.map(|v| v.to_string()),
        );
        add_config(
            "coordinator.request_timeout",
            self.coordinator.request_timeout.map(|v| v.to_string()),
        );
        add_config("prover.program", self.prover.program.clone());
        add_config("prover.timeout", self.prover.timeout.map(|v| v.to_string()));
        add_config(
            "submission.proving_time",
            self.submission.proving_time.map(|v| v.to_string()),
        );
        add_config("submission.cost", self.submission.cost.map(|v| v.to_string()));
        add_config("submission.price", self.submission.price.map(|v| v.to_string()));
        add_config(
            "submission.acceleration",
            self.submission.acceleration.as_ref().map(ToString::to_string),
        );
        add_config(
            "submission.deployment_version",
            self.submission.deployment_version.map(|v| v.to_string()),
        );
        add_config("submission.strict", self.submission.strict.map(|v| v.to_string()));

        config
    }
}
