//! Centralized CLI configuration.
//!
//! This module provides strongly-typed configuration for the runner,
//! loaded via the `config` crate from environment variables
//! (e.g. `ENGINE__MAX_STEPS=50`).

use serde::Deserialize;

/// Runner configuration.
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    /// Engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Engine-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum node invocations per run before the run is failed.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_max_steps() -> u32 {
    stateflow_engine::DEFAULT_MAX_STEPS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if set configuration values fail to parse.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_has_correct_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_steps, 100);
    }
}
