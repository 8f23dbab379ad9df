use crate::contract::swap::{
    validate_allocation, validate_deposit_return, validate_leverage, SwapContract,
};
use crate::core::config::ScenarioConfig;
use crate::core::error::{Result, SimulationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a (leverage, allocation) pair in the scenario grid.
///
/// Ids enumerate the cross-product with leverage as the outer and USD
/// allocation as the inner index:
/// `id = leverage_index * allocation_count + allocation_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(u32);

impl ScenarioId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contract terms of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    pub leverage: f64,
    pub usd_asset_allocation: f64,
    pub return_on_euro_deposits: f64,
    pub return_on_usd_deposits: f64,
}

impl ScenarioParameters {
    /// The swap contract these terms describe, struck at `start_exchange_rate`.
    pub fn contract(&self, start_exchange_rate: f64) -> Result<SwapContract> {
        SwapContract::new(start_exchange_rate, self.usd_asset_allocation, self.leverage)?
            .with_deposit_returns(self.return_on_euro_deposits, self.return_on_usd_deposits)
    }
}

/// Validated cross-product of leverages and USD allocations.
///
/// All values are checked on construction, so a grid that exists can be
/// evaluated without parameter errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScenarioGridFields")]
pub struct ScenarioGrid {
    leverages: Vec<f64>,
    allocations: Vec<f64>,
    return_on_euro_deposits: f64,
    return_on_usd_deposits: f64,
}

#[derive(Deserialize)]
struct ScenarioGridFields {
    leverages: Vec<f64>,
    allocations: Vec<f64>,
    return_on_euro_deposits: f64,
    return_on_usd_deposits: f64,
}

impl TryFrom<ScenarioGridFields> for ScenarioGrid {
    type Error = SimulationError;

    fn try_from(fields: ScenarioGridFields) -> Result<Self> {
        Self::new(fields.leverages, fields.allocations)?
            .with_deposit_returns(fields.return_on_euro_deposits, fields.return_on_usd_deposits)
    }
}

impl ScenarioGrid {
    pub fn new(leverages: Vec<f64>, allocations: Vec<f64>) -> Result<Self> {
        if leverages.is_empty() {
            return Err(SimulationError::invalid(
                "leverages",
                "[]",
                "at least one leverage is required",
            ));
        }
        if allocations.is_empty() {
            return Err(SimulationError::invalid(
                "usd_asset_allocations",
                "[]",
                "at least one allocation is required",
            ));
        }
        for &leverage in &leverages {
            validate_leverage(leverage)?;
        }
        for &allocation in &allocations {
            validate_allocation(allocation)?;
        }
        if u32::try_from(leverages.len() * allocations.len()).is_err() {
            return Err(SimulationError::invalid(
                "leverages",
                leverages.len(),
                "grid has more scenarios than scenario ids",
            ));
        }
        Ok(Self {
            leverages,
            allocations,
            return_on_euro_deposits: 0.0,
            return_on_usd_deposits: 0.0,
        })
    }

    pub fn with_deposit_returns(
        mut self,
        return_on_euro_deposits: f64,
        return_on_usd_deposits: f64,
    ) -> Result<Self> {
        validate_deposit_return("return_on_euro_deposits", return_on_euro_deposits)?;
        validate_deposit_return("return_on_usd_deposits", return_on_usd_deposits)?;
        self.return_on_euro_deposits = return_on_euro_deposits;
        self.return_on_usd_deposits = return_on_usd_deposits;
        Ok(self)
    }

    pub fn from_config(config: &ScenarioConfig) -> Result<Self> {
        Self::new(config.leverages.clone(), config.usd_asset_allocations.clone())?
            .with_deposit_returns(config.return_on_euro_deposits, config.return_on_usd_deposits)
    }

    pub fn leverages(&self) -> &[f64] {
        &self.leverages
    }

    pub fn allocations(&self) -> &[f64] {
        &self.allocations
    }

    /// Number of scenarios.
    pub fn len(&self) -> usize {
        self.leverages.len() * self.allocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Id of the scenario at (`leverage_index`, `allocation_index`).
    pub fn scenario_id(&self, leverage_index: usize, allocation_index: usize) -> Option<ScenarioId> {
        if leverage_index >= self.leverages.len() || allocation_index >= self.allocations.len() {
            return None;
        }
        let id = leverage_index * self.allocations.len() + allocation_index;
        Some(ScenarioId(id as u32))
    }

    pub fn parameters(&self, id: ScenarioId) -> Option<ScenarioParameters> {
        let index = id.index();
        if index >= self.len() {
            return None;
        }
        let leverage = self.leverages[index / self.allocations.len()];
        let usd_asset_allocation = self.allocations[index % self.allocations.len()];
        Some(ScenarioParameters {
            leverage,
            usd_asset_allocation,
            return_on_euro_deposits: self.return_on_euro_deposits,
            return_on_usd_deposits: self.return_on_usd_deposits,
        })
    }

    /// All scenarios in id order.
    pub fn scenarios(&self) -> impl Iterator<Item = (ScenarioId, ScenarioParameters)> + '_ {
        (0..self.len()).filter_map(move |i| {
            let id = ScenarioId(i as u32);
            self.parameters(id).map(|p| (id, p))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ScenarioGrid {
        ScenarioGrid::new(vec![3.0, 5.0, 7.0], vec![0.0, 0.5]).unwrap()
    }

    #[test]
    fn test_ids_enumerate_leverage_outer() {
        let g = grid();
        let params: Vec<_> = g
            .scenarios()
            .map(|(id, p)| (id.value(), p.leverage, p.usd_asset_allocation))
            .collect();
        assert_eq!(
            params,
            vec![
                (0, 3.0, 0.0),
                (1, 3.0, 0.5),
                (2, 5.0, 0.0),
                (3, 5.0, 0.5),
                (4, 7.0, 0.0),
                (5, 7.0, 0.5),
            ]
        );
    }

    #[test]
    fn test_scenario_id_arithmetic() {
        let g = grid();
        assert_eq!(g.scenario_id(2, 1), Some(ScenarioId::new(5)));
        assert_eq!(g.scenario_id(1, 0), Some(ScenarioId::new(2)));
        assert_eq!(g.scenario_id(3, 0), None);
        assert_eq!(g.scenario_id(0, 2), None);
        assert!(g.parameters(ScenarioId::new(6)).is_none());
    }

    #[test]
    fn test_invalid_values_rejected_up_front() {
        assert!(ScenarioGrid::new(vec![3.0, 1.0], vec![0.5]).is_err());
        assert!(ScenarioGrid::new(vec![3.0], vec![0.5, 1.2]).is_err());
        assert!(ScenarioGrid::new(vec![], vec![0.5]).is_err());
        assert!(ScenarioGrid::new(vec![3.0], vec![]).is_err());
    }

    #[test]
    fn test_deposit_returns_flow_into_parameters() {
        let g = grid().with_deposit_returns(0.01, 0.02).unwrap();
        let p = g.parameters(ScenarioId::new(0)).unwrap();
        assert_eq!(p.return_on_euro_deposits, 0.01);
        assert_eq!(p.return_on_usd_deposits, 0.02);
        assert!(p.contract(1.0).is_ok());
    }

    #[test]
    fn test_deserialize_revalidates_grid() {
        let bad = r#"{"leverages":[0.5],"allocations":[0.5],"return_on_euro_deposits":0.0,"return_on_usd_deposits":0.0}"#;
        assert!(serde_json::from_str::<ScenarioGrid>(bad).is_err());

        let empty = r#"{"leverages":[],"allocations":[0.5],"return_on_euro_deposits":0.0,"return_on_usd_deposits":0.0}"#;
        assert!(serde_json::from_str::<ScenarioGrid>(empty).is_err());

        let json = serde_json::to_string(&grid()).unwrap();
        assert_eq!(serde_json::from_str::<ScenarioGrid>(&json).unwrap(), grid());
    }

    #[test]
    fn test_from_default_config() {
        let g = ScenarioGrid::from_config(&ScenarioConfig::default()).unwrap();
        assert_eq!(g.len(), 24);
    }
}
