use std::{
    fs, io,
    path::{Path, PathBuf},
};

use life_defence_system_spawning::SpawnTuning;
use serde::Deserialize;

/// Seed used when no configuration overrides it.
pub const DEFAULT_SEED: u64 = 0x6c69_6665_2d64_6566;

/// Engine-wide settings shared by every session of a [`crate::SessionManager`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Global seed from which every session's spawn stream is derived.
    pub seed: u64,
    /// Spawn cadence and placement tuning.
    pub spawning: SpawnTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            spawning: SpawnTuning::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration document; omitted keys keep their defaults.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Reads and parses the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&document)
    }
}

/// Failures raised while loading an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read engine config at {}", path.display())]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The configuration document is not valid TOML or has mistyped keys.
    #[error("failed to parse engine config")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn nested_spawning_keys_override_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
                seed = 42

                [spawning]
                max_burst = 2

                [spawning.base_interval]
                easy = 60
            "#,
        )
        .expect("valid config");

        assert_eq!(config.seed, 42);
        assert_eq!(config.spawning.max_burst, 2);
        assert_eq!(config.spawning.base_interval.easy, 60);
        assert_eq!(
            config.spawning.wave_length,
            SpawnTuning::default().wave_length
        );
    }

    #[test]
    fn mistyped_values_are_rejected() {
        let error = EngineConfig::from_toml_str("seed = \"many\"").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = EngineConfig::load("/nonexistent/life-defence.toml").unwrap_err();
        assert!(error.to_string().contains("/nonexistent/life-defence.toml"));
    }
}
