use crate::core::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for path generation.
///
/// `bootstrap_replications` also accepts the historical key
/// `bootsstrap_sim_num` so older configuration files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Window length of one simulated path, in trading days.
    pub trading_days: usize,
    /// Number of stationary-bootstrap paths.
    #[serde(alias = "bootsstrap_sim_num")]
    pub bootstrap_replications: usize,
    /// Seed for the bootstrap random generator.
    pub simulation_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trading_days: 252,
            bootstrap_replications: 1_000,
            simulation_seed: 1,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trading_days == 0 {
            return Err(SimulationError::invalid(
                "trading_days",
                self.trading_days,
                "must be positive",
            ));
        }
        if self.bootstrap_replications == 0 {
            return Err(SimulationError::invalid(
                "bootstrap_replications",
                self.bootstrap_replications,
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// The (leverage × USD allocation) grid and the deposit-return assumptions
/// shared by every scenario in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub leverages: Vec<f64>,
    #[serde(alias = "USD_asset_allocations")]
    pub usd_asset_allocations: Vec<f64>,
    pub return_on_euro_deposits: f64,
    pub return_on_usd_deposits: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            leverages: vec![3.0, 5.0, 7.0, 10.0],
            usd_asset_allocations: vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0],
            return_on_euro_deposits: 0.0,
            return_on_usd_deposits: 0.0,
        }
    }
}

/// Complete configuration document for one pipeline run.
///
/// ```json
/// {
///   "simulation": { "trading_days": 252, "bootstrap_replications": 500, "simulation_seed": 7 },
///   "scenario": { "leverages": [3, 5], "usd_asset_allocations": [0.5] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub simulation: SimulationConfig,
    pub scenario: ScenarioConfig,
}

impl RunConfig {
    pub fn from_json(content: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(content)?;
        config.simulation.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = RunConfig::from_json(r#"{"simulation": {"trading_days": 20}}"#).unwrap();
        assert_eq!(config.simulation.trading_days, 20);
        assert_eq!(config.simulation.bootstrap_replications, 1_000);
        assert_eq!(config.scenario.leverages, vec![3.0, 5.0, 7.0, 10.0]);
    }

    #[test]
    fn test_legacy_replication_key() {
        let config = RunConfig::from_json(
            r#"{"simulation": {"trading_days": 10, "bootsstrap_sim_num": 42, "simulation_seed": 3}}"#,
        )
        .unwrap();
        assert_eq!(config.simulation.bootstrap_replications, 42);
        assert_eq!(config.simulation.simulation_seed, 3);
    }

    #[test]
    fn test_zero_trading_days_rejected() {
        let result = RunConfig::from_json(r#"{"simulation": {"trading_days": 0}}"#);
        assert!(matches!(
            result,
            Err(SimulationError::InvalidParameter { name: "trading_days", .. })
        ));
    }

    #[test]
    fn test_zero_replications_rejected() {
        let config = SimulationConfig {
            bootstrap_replications: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RunConfig::from_json("{not json"),
            Err(SimulationError::Json(_))
        ));
    }
}
