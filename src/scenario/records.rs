use crate::core::error::{Result, SimulationError};
use crate::sampling::paths::SimulationMethod;
use crate::scenario::grid::ScenarioId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Payouts of one scenario on one simulated path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub scenario_id: ScenarioId,
    pub path_index: usize,
    #[serde(rename = "EURlong_payout")]
    pub eur_long_payout: f64,
    #[serde(rename = "EURshort_payout")]
    pub eur_short_payout: f64,
    /// Terminal exchange rate, `1 + total return` of the path.
    pub exchange_rate: f64,
}

/// Contract terms behind a scenario id. One row per scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub scenario_id: ScenarioId,
    pub leverage: f64,
    #[serde(rename = "USD_asset_allocation")]
    pub usd_asset_allocation: f64,
    pub simulation_method: SimulationMethod,
}

/// Output of a scenario-grid run: the long payout table and its metadata.
///
/// Records are ordered by scenario id, then path index, and every scenario
/// has exactly `path_count` records, so the metadata join on `scenario_id`
/// always resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PayoutTableFields")]
pub struct PayoutTable {
    records: Vec<PayoutRecord>,
    metadata: Vec<RunMetadata>,
    path_count: usize,
}

#[derive(Deserialize)]
struct PayoutTableFields {
    records: Vec<PayoutRecord>,
    metadata: Vec<RunMetadata>,
    path_count: usize,
}

impl TryFrom<PayoutTableFields> for PayoutTable {
    type Error = SimulationError;

    fn try_from(fields: PayoutTableFields) -> Result<Self> {
        let table = PayoutTable {
            records: fields.records,
            metadata: fields.metadata,
            path_count: fields.path_count,
        };
        if !table.is_consistent() {
            return Err(SimulationError::InvalidSeries(
                "payout records do not match their run metadata".to_string(),
            ));
        }
        Ok(table)
    }
}

impl PayoutTable {
    pub(crate) fn new(
        records: Vec<PayoutRecord>,
        metadata: Vec<RunMetadata>,
        path_count: usize,
    ) -> Self {
        debug_assert_eq!(records.len(), metadata.len() * path_count);
        Self {
            records,
            metadata,
            path_count,
        }
    }

    pub fn records(&self) -> &[PayoutRecord] {
        &self.records
    }

    pub fn metadata(&self) -> &[RunMetadata] {
        &self.metadata
    }

    /// Number of simulated paths each scenario was evaluated on.
    pub fn path_count(&self) -> usize {
        self.path_count
    }

    pub fn scenario_count(&self) -> usize {
        self.metadata.len()
    }

    /// The records of one scenario, in path order.
    pub fn records_for(&self, id: ScenarioId) -> &[PayoutRecord] {
        let Some(start) = id.index().checked_mul(self.path_count) else {
            return &[];
        };
        start
            .checked_add(self.path_count)
            .and_then(|end| self.records.get(start..end))
            .unwrap_or(&[])
    }

    pub fn metadata_for(&self, id: ScenarioId) -> Option<&RunMetadata> {
        self.metadata.iter().find(|m| m.scenario_id == id)
    }

    /// Check the one-to-many join between metadata and records: unique
    /// metadata ids, every record id present in the metadata, and the same
    /// number of records for every scenario.
    pub fn is_consistent(&self) -> bool {
        let ids: HashSet<ScenarioId> = self.metadata.iter().map(|m| m.scenario_id).collect();
        if ids.len() != self.metadata.len() {
            return false;
        }
        if self.metadata.len().checked_mul(self.path_count) != Some(self.records.len()) {
            return false;
        }
        self.metadata
            .iter()
            .all(|m| self.records_for(m.scenario_id).iter().all(|r| r.scenario_id == m.scenario_id))
    }

    pub fn into_parts(self) -> (Vec<PayoutRecord>, Vec<RunMetadata>) {
        (self.records, self.metadata)
    }
}
