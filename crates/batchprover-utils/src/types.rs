//! Shared types used across batchprover crates.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Hardware class used to compute a proof, as recognized by the coordinator.
///
/// Known classes parse case-insensitively. Any other label is kept as
/// [`Acceleration::Other`] so new coordinator classes need no release.
/// Serializes to the upper-case label, e.g. `"GPU"` or `"NONE"`.
///
/// # Example
///
/// ```rust
/// use batchprover_utils::types::Acceleration;
///
/// let accel: Acceleration = "gpu".parse().unwrap();
/// assert_eq!(accel, Acceleration::Gpu);
/// assert_eq!(accel.as_str(), "GPU");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Acceleration {
    Gpu,
    Fpga,
    Asic,
    /// CPU only
    #[default]
    None,
    Other(String),
}

impl Acceleration {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gpu => "GPU",
            Self::Fpga => "FPGA",
            Self::Asic => "ASIC",
            Self::None => "NONE",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for Acceleration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an acceleration label is empty or contains whitespace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid acceleration class '{0}': expected GPU, FPGA, ASIC, NONE or a single-word label")]
pub struct InvalidAcceleration(pub String);

impl FromStr for Acceleration {
    type Err = InvalidAcceleration;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || !trimmed.is_ascii()
            || trimmed.chars().any(|c| c.is_ascii_whitespace())
        {
            return Err(InvalidAcceleration(s.to_string()));
        }

        let upper = trimmed.to_ascii_uppercase();
        Ok(match upper.as_str() {
            "GPU" => Self::Gpu,
            "FPGA" => Self::Fpga,
            "ASIC" => Self::Asic,
            "NONE" | "CPU" => Self::None,
            _ => Self::Other(upper),
        })
    }
}

impl Serialize for Acceleration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Acceleration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Source of a configuration value.
///
/// Indicates where a configuration value originated from in the precedence chain:
/// CLI arguments > environment > config file > programmatic > built-in defaults.
///
/// Serializes to lowercase strings: `"cli"`, `"env"`, `"config"`, `"programmatic"`, `"default"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value read from a `BATCHPROVER_*` environment variable.
    Env,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cli => "cli",
            Self::Env => "env",
            Self::Config => "config",
            Self::Programmatic => "programmatic",
            Self::Default => "default",
        };
        f.write_str(label)
    }
}
