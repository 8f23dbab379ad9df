use crate::contract::swap::PayoutFormula;
use crate::core::config::ScenarioConfig;
use crate::core::error::Result;
use crate::sampling::paths::ResampledPathSet;
use crate::scenario::grid::ScenarioGrid;
use crate::scenario::records::{PayoutRecord, PayoutTable, RunMetadata};
use rayon::prelude::*;

/// Exchange rate at inception. Paths are expressed as changes relative to it.
pub const START_EXCHANGE_RATE: f64 = 1.0;

/// Evaluates every scenario of a grid on every path of a path set.
///
/// Scenarios are evaluated in parallel. Each worker reads the shared path
/// set and builds its own record buffer; buffers are concatenated in
/// scenario-id order, so the output does not depend on scheduling. The
/// first failing scenario aborts the run and no table is returned.
///
/// # Examples
///
/// ```
/// use swap_payout_sim::core::series::ReturnSeries;
/// use swap_payout_sim::sampling::historical::generate_historical;
/// use swap_payout_sim::scenario::grid::ScenarioGrid;
/// use swap_payout_sim::scenario::runner::ScenarioRunner;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2001, 3, 1).unwrap();
/// let series = ReturnSeries::from_daily(start, vec![0.01, -0.02, 0.005, 0.0, 0.01]).unwrap();
/// let paths = generate_historical(&series, 3).unwrap();
///
/// let grid = ScenarioGrid::new(vec![3.0, 5.0], vec![0.0, 0.5, 1.0]).unwrap();
/// let table = ScenarioRunner::new(grid).run(&paths).unwrap();
///
/// assert_eq!(table.metadata().len(), 6);
/// assert_eq!(table.records().len(), 6 * 2);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    grid: ScenarioGrid,
    formula: PayoutFormula,
}

impl ScenarioRunner {
    pub fn new(grid: ScenarioGrid) -> Self {
        Self {
            grid,
            formula: PayoutFormula::default(),
        }
    }

    pub fn with_formula(mut self, formula: PayoutFormula) -> Self {
        self.formula = formula;
        self
    }

    pub fn grid(&self) -> &ScenarioGrid {
        &self.grid
    }

    /// Evaluate the grid on `paths`.
    pub fn run(&self, paths: &ResampledPathSet) -> Result<PayoutTable> {
        let final_rates = paths.final_exchange_rates(START_EXCHANGE_RATE);
        let scenarios: Vec<_> = self.grid.scenarios().collect();

        log::info!(
            "evaluating {} scenarios on {} {} paths",
            scenarios.len(),
            final_rates.len(),
            paths.method()
        );

        let per_scenario = scenarios
            .par_iter()
            .map(|(id, params)| -> Result<Vec<PayoutRecord>> {
                let contract = params
                    .contract(START_EXCHANGE_RATE)?
                    .with_formula(self.formula);
                let records: Vec<PayoutRecord> = contract
                    .payout_series(&final_rates)
                    .into_iter()
                    .zip(&final_rates)
                    .enumerate()
                    .map(|(path_index, (payout, &exchange_rate))| PayoutRecord {
                        scenario_id: *id,
                        path_index,
                        eur_long_payout: payout.eur_long,
                        eur_short_payout: payout.eur_short,
                        exchange_rate,
                    })
                    .collect();
                log::debug!(
                    "scenario {}: leverage {}, USD allocation {}",
                    id,
                    params.leverage,
                    params.usd_asset_allocation
                );
                Ok(records)
            })
            .collect::<Result<Vec<_>>>()?;

        let metadata = scenarios
            .iter()
            .map(|(id, params)| RunMetadata {
                scenario_id: *id,
                leverage: params.leverage,
                usd_asset_allocation: params.usd_asset_allocation,
                simulation_method: paths.method(),
            })
            .collect();
        let records = per_scenario.into_iter().flatten().collect();

        Ok(PayoutTable::new(records, metadata, final_rates.len()))
    }
}

/// Build a grid from `config` and evaluate it on `paths`.
pub fn run_scenarios(paths: &ResampledPathSet, config: &ScenarioConfig) -> Result<PayoutTable> {
    let grid = ScenarioGrid::from_config(config)?;
    ScenarioRunner::new(grid).run(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::swap::SwapContract;
    use crate::sampling::paths::SimulationMethod;
    use crate::scenario::grid::ScenarioId;
    use approx::assert_abs_diff_eq;

    fn paths() -> ResampledPathSet {
        ResampledPathSet::new(
            SimulationMethod::Bootstrap,
            3,
            vec![
                0.05, 0.03, 0.02, // +10%
                -0.04, -0.04, -0.02, // -10%
                0.01, -0.01, 0.0, // flat
                0.0, 0.0, 0.0, // flat
            ],
            None,
        )
    }

    #[test]
    fn test_row_counts() {
        let grid = ScenarioGrid::new(vec![3.0, 5.0, 7.0, 10.0], vec![0.0, 0.5, 1.0]).unwrap();
        let table = ScenarioRunner::new(grid).run(&paths()).unwrap();
        assert_eq!(table.metadata().len(), 12);
        assert_eq!(table.records().len(), 12 * 4);
        assert_eq!(table.path_count(), 4);
        assert!(table.is_consistent());
    }

    #[test]
    fn test_records_ordered_by_scenario_then_path() {
        let grid = ScenarioGrid::new(vec![3.0, 5.0], vec![0.5]).unwrap();
        let table = ScenarioRunner::new(grid).run(&paths()).unwrap();
        let keys: Vec<_> = table
            .records()
            .iter()
            .map(|r| (r.scenario_id.value(), r.path_index))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys[0], (0, 0));
        assert_eq!(keys[7], (1, 3));
    }

    #[test]
    fn test_payouts_match_contract() {
        let grid = ScenarioGrid::new(vec![5.0], vec![0.5]).unwrap();
        let table = ScenarioRunner::new(grid).run(&paths()).unwrap();
        let contract = SwapContract::new(1.0, 0.5, 5.0).unwrap();

        let first = table.records()[0];
        assert_abs_diff_eq!(first.exchange_rate, 1.1, epsilon = 1e-12);
        let expected = contract.payout(first.exchange_rate);
        assert_eq!(first.eur_long_payout, expected.eur_long);
        assert_eq!(first.eur_short_payout, expected.eur_short);

        let flat = table.records()[3];
        assert_abs_diff_eq!(flat.eur_long_payout, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(flat.eur_short_payout, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_metadata_carries_method_and_terms() {
        let grid = ScenarioGrid::new(vec![3.0, 10.0], vec![0.2, 0.8]).unwrap();
        let table = ScenarioRunner::new(grid).run(&paths()).unwrap();
        let meta = table.metadata_for(ScenarioId::new(2)).unwrap();
        assert_eq!(meta.leverage, 10.0);
        assert_eq!(meta.usd_asset_allocation, 0.2);
        assert_eq!(meta.simulation_method, SimulationMethod::Bootstrap);
    }

    #[test]
    fn test_premium_split_formula() {
        let grid = ScenarioGrid::new(vec![5.0], vec![0.5]).unwrap();
        let table = ScenarioRunner::new(grid)
            .with_formula(PayoutFormula::PremiumSplit)
            .run(&paths())
            .unwrap();
        assert_abs_diff_eq!(table.records()[0].eur_long_payout, 1.5, epsilon = 1e-4);
        assert_abs_diff_eq!(table.records()[0].eur_short_payout, 0.6, epsilon = 1e-4);
    }

    #[test]
    fn test_run_scenarios_rejects_invalid_config() {
        let config = ScenarioConfig {
            leverages: vec![5.0, 0.5],
            ..Default::default()
        };
        assert!(run_scenarios(&paths(), &config).is_err());
    }
}
