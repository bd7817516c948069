use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid log level: {0}. must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("router.max_tokens must be positive")]
    InvalidMaxTokens,

    #[error("router.max_cost must be positive")]
    InvalidMaxCost,

    #[error("limits.max_fix_attempts must be at least 1")]
    InvalidMaxFixAttempts,

    #[error("boundary.protected_paths entry cannot be empty")]
    EmptyProtectedPath,
}

/// Loads and validates `Config` by merging, in increasing precedence:
/// programmatic defaults, `.glitchlab/config.yaml`, `.glitchlab/local.yaml`,
/// and `GLITCHLAB_`-prefixed environment variables.
///
/// Configuration is always resolved relative to the current working
/// directory so a single machine can run the pipeline against several
/// repositories, each with its own `.glitchlab/` settings.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".glitchlab/config.yaml"))
            .merge(Yaml::file(".glitchlab/local.yaml"))
            .merge(Env::prefixed("GLITCHLAB_").split("__"))
            .extract()
            .context("failed to extract configuration")?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.router.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens);
        }
        if config.router.max_cost <= 0.0 {
            return Err(ConfigError::InvalidMaxCost);
        }
        if config.limits.max_fix_attempts == 0 {
            return Err(ConfigError::InvalidMaxFixAttempts);
        }
        if config.boundaries.protected_paths.iter().any(String::is_empty) {
            return Err(ConfigError::EmptyProtectedPath);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        ConfigLoader::validate(&config).expect("default config should validate");
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn rejects_zero_max_fix_attempts() {
        let mut config = Config::default();
        config.limits.max_fix_attempts = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::InvalidMaxFixAttempts)));
    }

    #[test]
    fn yaml_overrides_merge_over_defaults() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "workspace:\n  base_branch: develop\nlogging:\n  level: debug").unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.workspace.base_branch, "develop");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.sandbox.default_timeout_secs, Config::default().sandbox.default_timeout_secs);
    }

    #[test]
    fn hierarchical_merge_lets_later_files_win() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base = NamedTempFile::new().unwrap();
        writeln!(base, "limits:\n  max_fix_attempts: 5\n  test_timeout_secs: 60").unwrap();
        base.flush().unwrap();

        let mut overrides = NamedTempFile::new().unwrap();
        writeln!(overrides, "limits:\n  max_fix_attempts: 2").unwrap();
        overrides.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base.path()))
            .merge(Yaml::file(overrides.path()))
            .extract()
            .unwrap();

        assert_eq!(config.limits.max_fix_attempts, 2, "override file should win");
        assert_eq!(config.limits.test_timeout_secs, 60, "base file value should persist");
    }
}
