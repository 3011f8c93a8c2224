//! Top-level Specdrift configuration with 4-layer resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{EngineConfig, ExtractConfig, ScheduleConfig, StorageConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`SPECDRIFT_*`)
/// 3. Project config (`specdrift.toml` in project root)
/// 4. User config (`~/.specdrift/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpecdriftConfig {
    pub extract: ExtractConfig,
    pub engine: EngineConfig,
    pub schedule: ScheduleConfig,
    pub storage: StorageConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub rules_file: Option<String>,
    pub corpus_dir: Option<String>,
    pub db_path: Option<String>,
    pub debounce_ms: Option<u64>,
    pub provider_timeout_ms: Option<u64>,
}

impl SpecdriftConfig {
    /// Load configuration with 4-layer resolution.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(_) => {
                        // Non-parse errors from user config are not fatal.
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join("specdrift.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &SpecdriftConfig) -> Result<(), ConfigError> {
        if let Some(debounce) = config.schedule.debounce_ms {
            if debounce == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "schedule.debounce_ms".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(timeout) = config.engine.provider_timeout_ms {
            if timeout == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "engine.provider_timeout_ms".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(workers) = config.engine.workers {
            if workers == 0 || workers > 256 {
                return Err(ConfigError::ValidationFailed {
                    field: "engine.workers".to_string(),
                    message: "must be between 1 and 256".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut SpecdriftConfig, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let file_config: SpecdriftConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base`
    /// values only when `other` has a `Some` value.
    fn merge(base: &mut SpecdriftConfig, other: &SpecdriftConfig) {
        if other.extract.corpus_dir.is_some() {
            base.extract.corpus_dir = other.extract.corpus_dir.clone();
        }
        if !other.extract.extensions.is_empty() {
            base.extract.extensions = other.extract.extensions.clone();
        }
        if other.engine.rules_file.is_some() {
            base.engine.rules_file = other.engine.rules_file.clone();
        }
        if other.engine.provider_timeout_ms.is_some() {
            base.engine.provider_timeout_ms = other.engine.provider_timeout_ms;
        }
        if other.engine.workers.is_some() {
            base.engine.workers = other.engine.workers;
        }
        if other.schedule.debounce_ms.is_some() {
            base.schedule.debounce_ms = other.schedule.debounce_ms;
        }
        if other.storage.db_path.is_some() {
            base.storage.db_path = other.storage.db_path.clone();
        }
        if other.storage.retention_days.is_some() {
            base.storage.retention_days = other.storage.retention_days;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `SPECDRIFT_ENGINE_PROVIDER_TIMEOUT_MS`, `SPECDRIFT_SCHEDULE_DEBOUNCE_MS`, etc.
    fn apply_env_overrides(config: &mut SpecdriftConfig) {
        if let Ok(val) = std::env::var("SPECDRIFT_EXTRACT_CORPUS_DIR") {
            config.extract.corpus_dir = Some(val);
        }
        if let Ok(val) = std::env::var("SPECDRIFT_ENGINE_RULES_FILE") {
            config.engine.rules_file = Some(val);
        }
        if let Ok(val) = std::env::var("SPECDRIFT_ENGINE_PROVIDER_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.engine.provider_timeout_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SPECDRIFT_ENGINE_WORKERS") {
            if let Ok(v) = val.parse::<usize>() {
                config.engine.workers = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SPECDRIFT_SCHEDULE_DEBOUNCE_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.schedule.debounce_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("SPECDRIFT_STORAGE_DB_PATH") {
            config.storage.db_path = Some(val);
        }
        if let Ok(val) = std::env::var("SPECDRIFT_STORAGE_RETENTION_DAYS") {
            if let Ok(v) = val.parse::<u32>() {
                config.storage.retention_days = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut SpecdriftConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.rules_file {
            config.engine.rules_file = Some(v.clone());
        }
        if let Some(ref v) = cli.corpus_dir {
            config.extract.corpus_dir = Some(v.clone());
        }
        if let Some(ref v) = cli.db_path {
            config.storage.db_path = Some(v.clone());
        }
        if let Some(v) = cli.debounce_ms {
            config.schedule.debounce_ms = Some(v);
        }
        if let Some(v) = cli.provider_timeout_ms {
            config.engine.provider_timeout_ms = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user config path: `~/.specdrift/config.toml`.
fn user_config_path() -> Option<std::path::PathBuf> {
    home_dir().map(|h| h.join(".specdrift").join("config.toml"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_toml_merges_over_defaults() {
        let config = SpecdriftConfig::from_toml(
            r#"
[schedule]
debounce_ms = 100

[engine]
provider_timeout_ms = 1000
"#,
        )
        .unwrap();
        assert_eq!(config.schedule.effective_debounce_ms(), 100);
        assert_eq!(config.engine.effective_provider_timeout_ms(), 1000);
        // Untouched sections keep compiled defaults.
        assert_eq!(config.extract.effective_corpus_dir(), "spec");
    }

    #[test]
    fn zero_debounce_fails_validation() {
        let err = SpecdriftConfig::from_toml("[schedule]\ndebounce_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }
}
