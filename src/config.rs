use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 1986;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const HEALTH_PATH: &str = "/health";

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Configuration {
    pub port: u16,
    pub metrics_path: String,
    pub timeout_seconds: u64,
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Where the effective configuration came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    Defaults,
    Missing,
    File,
}

impl Configuration {
    /// Loads the YAML file at `path`. A path that does not exist falls back to
    /// the defaults; a file that exists but cannot be read or parsed is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<(Self, ConfigSource)> {
        let (mut config, source) = match path {
            None => (Self::default(), ConfigSource::Defaults),
            Some(path) if !path.exists() => (Self::default(), ConfigSource::Missing),
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                (Self::from_yaml(&content)?, ConfigSource::File)
            }
        };

        config.apply_env_overrides(std::env::var(LOG_LEVEL_ENV).ok());
        config.validate()?;

        Ok((config, source))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        // an empty document deserializes as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).context("Error parsing YAML")
    }

    pub fn apply_env_overrides(&mut self, log_level: Option<String>) {
        if let Some(level) = log_level.filter(|l| !l.trim().is_empty()) {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            bail!("port must be positive");
        }

        if !self.metrics_path.starts_with('/') {
            bail!(
                "metrics_path must start with '/', got '{}'",
                self.metrics_path
            );
        }

        // axum treats these as captures and wildcards and refuses them at startup
        if let Some(c) = self.metrics_path.chars().find(|c| matches!(*c, '*' | ':' | '{' | '}')) {
            bail!(
                "metrics_path must be a literal path, found '{}' in '{}'",
                c,
                self.metrics_path
            );
        }

        if self.metrics_path == HEALTH_PATH {
            bail!("metrics_path must not be {}", HEALTH_PATH);
        }

        if self.timeout_seconds == 0 {
            bail!("timeout_seconds must be positive");
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
