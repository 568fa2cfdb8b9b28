//! Configuration management.
//!
//! Parameters come from:
//! - TOML config files (partial files fill in from the baseline defaults)
//! - Built-in named scenarios
//! - CLI flag overrides (applied by the binary)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::params::Parameters;

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Model parameters. Missing fields take baseline defaults.
    #[serde(default)]
    pub params: Parameters,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ModelError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| ModelError::Config(format!("Failed to parse config: {e}")))
    }

    /// Default config file location (`<config dir>/horizon/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("horizon").join("config.toml"))
    }
}

/// Names of the built-in scenarios.
pub const SCENARIO_NAMES: [&str; 3] = ["baseline", "fast-decline", "hardened"];

/// Look up a built-in scenario by name.
///
/// - `baseline`: the canonical defaults.
/// - `fast-decline`: aggressive cost decline with little damping, the world
///   where compute falls off a cliff.
/// - `hardened`: every intervention turned up, safeguard calibrated for
///   bigger budgets.
pub fn scenario(name: &str) -> Result<Parameters> {
    match name {
        "baseline" => Ok(Parameters::default()),
        "fast-decline" => Ok(Parameters {
            training_decay_rate: 4.0,
            training_damping: 0.05,
            fine_tune_decay_rate: 3.0,
            fine_tune_damping: 0.05,
            ..Default::default()
        }),
        "hardened" => Ok(Parameters {
            safeguard_strength: 95.0,
            screening_coverage: 90.0,
            screening_novel_detect: 70.0,
            surveillance_eff: 60.0,
            compute_gov_threshold_m: 1.0,
            steps_to_break: 50_000_000,
            safeguard_budget_threshold: 10_000_000.0,
            ..Default::default()
        }),
        other => Err(ModelError::UnknownName(format!("scenario '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_baseline() {
        let config = Config::default();
        assert_eq!(config.params, Parameters::default());
    }

    #[test]
    fn test_config_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[params]\nmodel_size_b = 70.0\nsafeguard_strength = 90.0"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.params.model_size_b, 70.0);
        assert_eq!(config.params.safeguard_strength, 90.0);
        // Unspecified fields keep their defaults.
        assert_eq!(
            config.params.training_decay_rate,
            Parameters::default().training_decay_rate
        );
    }

    #[test]
    fn test_config_missing_file_is_an_error() {
        let err = Config::from_file("/nonexistent/horizon.toml").unwrap_err();
        assert!(err.to_string().contains("Config error"));
    }

    #[test]
    fn test_config_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[params\nmodel_size_b = ").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_every_scenario_validates() {
        for name in SCENARIO_NAMES {
            let params = scenario(name).unwrap();
            assert!(params.validate().is_ok(), "scenario {name}");
        }
    }

    #[test]
    fn test_unknown_scenario() {
        assert!(scenario("utopia").is_err());
    }
}
