use crate::sampling::paths::SimulationMethod;
use crate::scenario::grid::ScenarioId;
use crate::scenario::records::PayoutTable;
use serde::{Deserialize, Serialize};

/// Tail-risk statistics of one scenario across all simulated paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub scenario_id: ScenarioId,
    pub leverage: f64,
    #[serde(rename = "USD_asset_allocation")]
    pub usd_asset_allocation: f64,
    pub simulation_method: SimulationMethod,
    pub path_count: usize,
    /// Share of paths on which the EURlong certificate pays out less than zero.
    pub eur_long_negative_share: f64,
    pub eur_short_negative_share: f64,
    /// Share of paths on which at least one leg pays out less than zero.
    pub any_negative_share: f64,
    pub eur_long_mean: f64,
    pub eur_short_mean: f64,
    pub eur_long_min: f64,
    pub eur_short_min: f64,
}

/// Summary statistics of every scenario in `table`, in scenario-id order.
///
/// Scenarios evaluated on zero paths report zero shares and NaN means.
pub fn summarize(table: &PayoutTable) -> Vec<ScenarioSummary> {
    table
        .metadata()
        .iter()
        .map(|meta| {
            let records = table.records_for(meta.scenario_id);
            let n = records.len() as f64;
            let share = |count: usize| if records.is_empty() { 0.0 } else { count as f64 / n };

            let long_negative = records.iter().filter(|r| r.eur_long_payout < 0.0).count();
            let short_negative = records.iter().filter(|r| r.eur_short_payout < 0.0).count();
            let any_negative = records
                .iter()
                .filter(|r| r.eur_long_payout < 0.0 || r.eur_short_payout < 0.0)
                .count();
            let long_sum: f64 = records.iter().map(|r| r.eur_long_payout).sum();
            let short_sum: f64 = records.iter().map(|r| r.eur_short_payout).sum();

            ScenarioSummary {
                scenario_id: meta.scenario_id,
                leverage: meta.leverage,
                usd_asset_allocation: meta.usd_asset_allocation,
                simulation_method: meta.simulation_method,
                path_count: records.len(),
                eur_long_negative_share: share(long_negative),
                eur_short_negative_share: share(short_negative),
                any_negative_share: share(any_negative),
                eur_long_mean: long_sum / n,
                eur_short_mean: short_sum / n,
                eur_long_min: records
                    .iter()
                    .map(|r| r.eur_long_payout)
                    .fold(f64::INFINITY, f64::min),
                eur_short_min: records
                    .iter()
                    .map(|r| r.eur_short_payout)
                    .fold(f64::INFINITY, f64::min),
            }
        })
        .collect()
}

/// Text report of a set of scenario summaries, one row per scenario.
///
/// Rows may mix simulation methods; each row names its own method and
/// path count.
pub struct SummaryReport<'a>(pub &'a [ScenarioSummary]);

impl std::fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Swap Payout Tail Risk ===")?;
        writeln!(
            f,
            "\n{:>10} {:>6} {:>4} {:>8} {:>8} {:>10} {:>10} {:>10} {:>10}",
            "method", "paths", "id", "leverage", "USD", "P(long<0)", "P(short<0)", "E[long]", "E[short]"
        )?;
        for s in self.0 {
            writeln!(
                f,
                "{:>10} {:>6} {:>4} {:>8.2} {:>8.2} {:>9.2}% {:>9.2}% {:>10.4} {:>10.4}",
                s.simulation_method.as_str(),
                s.path_count,
                s.scenario_id,
                s.leverage,
                s.usd_asset_allocation,
                s.eur_long_negative_share * 100.0,
                s.eur_short_negative_share * 100.0,
                s.eur_long_mean,
                s.eur_short_mean
            )?;
        }
        Ok(())
    }
}
