use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use batchprover_utils::error::{BatchProverError, ConfigError};
use batchprover_utils::types::{Acceleration, ConfigSource};

use crate::model::TomlConfig;
use crate::{CliArgs, Config, CoordinatorConfig, ProverConfig, SubmissionConfig};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "BATCHPROVER_CONFIG";

/// Environment overrides, in the order they are applied.
pub const ENV_PROVER: &str = "BATCHPROVER_PROVER";
pub const ENV_PROVER_TIMEOUT: &str = "BATCHPROVER_PROVER_TIMEOUT";
pub const ENV_PROVING_TIME: &str = "BATCHPROVER_PROVING_TIME";
pub const ENV_COST: &str = "BATCHPROVER_COST";
pub const ENV_PRICE: &str = "BATCHPROVER_PRICE";
pub const ENV_ACCELERATION: &str = "BATCHPROVER_ACCELERATION";
pub const ENV_DEPLOYMENT_VERSION: &str = "BATCHPROVER_DEPLOYMENT_VERSION";
pub const ENV_STRICT_SUBMIT: &str = "BATCHPROVER_STRICT_SUBMIT";

const CONFIG_DIR: &str = ".batchprover";
const CONFIG_FILE: &str = "config.toml";

/// Overwrite `slot` with `value` when present and record where it came from.
fn apply<T>(
    slot: &mut Option<T>,
    value: Option<T>,
    key: &str,
    source: ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if let Some(value) = value {
        *slot = Some(value);
        attribution.insert(key.to_string(), source);
    }
}

/// Read and parse one environment override. Empty values count as unset.
fn env_value<T, F>(env: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match env(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: name.to_string(),
                value: format!("'{raw}': {e}"),
            }),
        _ => Ok(None),
    }
}

fn env_flag<F>(env: &F, name: &str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = env(name) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue {
            key: name.to_string(),
            value: format!("'{raw}': expected true or false"),
        }),
    }
}

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults
    ///
    /// Uses the current working directory for config file discovery and the
    /// process environment for overrides.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, BatchProverError> {
        let start_dir = std::env::current_dir()?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover configuration starting from a specific directory.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self, BatchProverError> {
        Self::discover_with_env(start_dir, cli_args, |name| std::env::var(name).ok())
    }

    /// Discover configuration with an explicit environment reader.
    ///
    /// This is the variant used by tests to avoid process-global state.
    pub fn discover_with_env<F>(
        start_dir: &Path,
        cli_args: &CliArgs,
        env: F,
    ) -> Result<Self, BatchProverError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut source_attribution = HashMap::new();

        let mut coordinator = CoordinatorConfig::default();
        let mut prover = ProverConfig::default();
        let mut submission = SubmissionConfig::default();

        for key in [
            "coordinator.connect_timeout",
            "coordinator.request_timeout",
            "prover.program",
            "prover.timeout",
            "submission.proving_time",
            "submission.cost",
            "submission.price",
            "submission.acceleration",
            "submission.deployment_version",
            "submission.strict",
        ] {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }

        // Explicit path (CLI, then env) wins over discovery
        let explicit_path = cli_args
            .config_path
            .clone()
            .or_else(|| env(CONFIG_PATH_ENV).filter(|p| !p.is_empty()).map(PathBuf::from));

        let config_path = match explicit_path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Some(path) => Some(path),
            None => Self::discover_config_file_from(start_dir),
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))
                .map_err(|e| ConfigError::InvalidFile(format!("{e:#}")))?;

            let src = ConfigSource::Config;
            let attr = &mut source_attribution;

            if let Some(file) = file_config.coordinator {
                apply(
                    &mut coordinator.connect_timeout,
                    file.connect_timeout,
                    "coordinator.connect_timeout",
                    src,
                    attr,
                );
                apply(
                    &mut coordinator.request_timeout,
                    file.request_timeout,
                    "coordinator.request_timeout",
                    src,
                    attr,
                );
            }
            if let Some(file) = file_config.prover {
                apply(
                    &mut prover.program,
                    file.program,
                    "prover.program",
                    src,
                    attr,
                );
                apply(
                    &mut prover.timeout,
                    file.timeout,
                    "prover.timeout",
                    src,
                    attr,
                );
            }
            if let Some(file) = file_config.submission {
                apply(
                    &mut submission.proving_time,
                    file.proving_time,
                    "submission.proving_time",
                    src,
                    attr,
                );
                apply(
                    &mut submission.cost,
                    file.cost,
                    "submission.cost",
                    src,
                    attr,
                );
                apply(
                    &mut submission.price,
                    file.price,
                    "submission.price",
                    src,
                    attr,
                );
                apply(
                    &mut submission.acceleration,
                    file.acceleration,
                    "submission.acceleration",
                    src,
                    attr,
                );
                apply(
                    &mut submission.deployment_version,
                    file.deployment_version,
                    "submission.deployment_version",
                    src,
                    attr,
                );
                apply(
                    &mut submission.strict,
                    file.strict,
                    "submission.strict",
                    src,
                    attr,
                );
            }
        }

        // Environment overrides (override file)
        {
            let src = ConfigSource::Env;
            let attr = &mut source_attribution;

            apply(
                &mut prover.program,
                env_value::<String, _>(&env, ENV_PROVER)?,
                "prover.program",
                src,
                attr,
            );
            apply(
                &mut prover.timeout,
                env_value(&env, ENV_PROVER_TIMEOUT)?,
                "prover.timeout",
                src,
                attr,
            );
            apply(
                &mut submission.proving_time,
                env_value(&env, ENV_PROVING_TIME)?,
                "submission.proving_time",
                src,
                attr,
            );
            apply(
                &mut submission.cost,
                env_value(&env, ENV_COST)?,
                "submission.cost",
                src,
                attr,
            );
            apply(
                &mut submission.price,
                env_value(&env, ENV_PRICE)?,
                "submission.price",
                src,
                attr,
            );
            apply(
                &mut submission.acceleration,
                env_value::<Acceleration, _>(&env, ENV_ACCELERATION)?,
                "submission.acceleration",
                src,
                attr,
            );
            apply(
                &mut submission.deployment_version,
                env_value(&env, ENV_DEPLOYMENT_VERSION)?,
                "submission.deployment_version",
                src,
                attr,
            );
            apply(
                &mut submission.strict,
                env_flag(&env, ENV_STRICT_SUBMIT)?,
                "submission.strict",
                src,
                attr,
            );
        }

        // Apply CLI overrides (highest priority)
        {
            let src = ConfigSource::Cli;
            let attr = &mut source_attribution;

            apply(
                &mut coordinator.connect_timeout,
                cli_args.connect_timeout,
                "coordinator.connect_timeout",
                src,
                attr,
            );
            apply(
                &mut coordinator.request_timeout,
                cli_args.request_timeout,
                "coordinator.request_timeout",
                src,
                attr,
            );
            apply(
                &mut prover.program,
                cli_args.prover_program.clone(),
                "prover.program",
                src,
                attr,
            );
            apply(
                &mut prover.timeout,
                cli_args.prover_timeout,
                "prover.timeout",
                src,
                attr,
            );
            apply(
                &mut submission.proving_time,
                cli_args.proving_time,
                "submission.proving_time",
                src,
                attr,
            );
            apply(
                &mut submission.cost,
                cli_args.cost,
                "submission.cost",
                src,
                attr,
            );
            apply(
                &mut submission.price,
                cli_args.price,
                "submission.price",
                src,
                attr,
            );
            apply(
                &mut submission.acceleration,
                cli_args.acceleration.clone(),
                "submission.acceleration",
                src,
                attr,
            );
            apply(
                &mut submission.deployment_version,
                cli_args.deployment_version,
                "submission.deployment_version",
                src,
                attr,
            );
            // A switch can only turn strict mode on
            apply(
                &mut submission.strict,
                cli_args.strict_submit.then_some(true),
                "submission.strict",
                src,
                attr,
            );
        }

        let config = Self {
            coordinator,
            prover,
            submission,
            config_path,
            source_attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Discover config file by searching upward from a given directory
    ///
    /// Walks up the directory tree looking for `.batchprover/config.toml`,
    /// stopping at repository root markers (.git, .hg, .svn) or filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = Some(start_dir);

        while let Some(dir) = current_dir {
            let config_path = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.is_file() {
                return Some(config_path);
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists() {
                break;
            }

            current_dir = dir.parent();
        }

        None
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}
