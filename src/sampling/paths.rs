use crate::core::error::{Result, SimulationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a set of simulated paths was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMethod {
    Historical,
    Bootstrap,
}

impl SimulationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationMethod::Historical => "historical",
            SimulationMethod::Bootstrap => "bootstrap",
        }
    }
}

impl fmt::Display for SimulationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SimulationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "historical" => Ok(SimulationMethod::Historical),
            "bootstrap" | "bootstrapped" => Ok(SimulationMethod::Bootstrap),
            other => Err(format!("unknown simulation method '{}'", other)),
        }
    }
}

/// K simulated return paths of equal length.
///
/// Stored row-major: path `i` occupies `values[i * trading_days..(i + 1) * trading_days]`.
/// Historical paths carry the calendar date of their first observation;
/// bootstrap paths have no calendar anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PathSetFields")]
pub struct ResampledPathSet {
    method: SimulationMethod,
    trading_days: usize,
    values: Vec<f64>,
    start_dates: Option<Vec<NaiveDate>>,
}

#[derive(Deserialize)]
struct PathSetFields {
    method: SimulationMethod,
    trading_days: usize,
    values: Vec<f64>,
    start_dates: Option<Vec<NaiveDate>>,
}

impl TryFrom<PathSetFields> for ResampledPathSet {
    type Error = SimulationError;

    fn try_from(fields: PathSetFields) -> Result<Self> {
        if fields.trading_days == 0 {
            return Err(SimulationError::invalid(
                "trading_days",
                fields.trading_days,
                "must be positive",
            ));
        }
        if fields.values.len() % fields.trading_days != 0 {
            return Err(SimulationError::InvalidSeries(format!(
                "{} values do not split into paths of {} trading days",
                fields.values.len(),
                fields.trading_days
            )));
        }
        let paths = fields.values.len() / fields.trading_days;
        if let Some(dates) = &fields.start_dates {
            if dates.len() != paths {
                return Err(SimulationError::InvalidSeries(format!(
                    "{} start dates for {} paths",
                    dates.len(),
                    paths
                )));
            }
        }
        Ok(Self::new(
            fields.method,
            fields.trading_days,
            fields.values,
            fields.start_dates,
        ))
    }
}

impl ResampledPathSet {
    pub(crate) fn new(
        method: SimulationMethod,
        trading_days: usize,
        values: Vec<f64>,
        start_dates: Option<Vec<NaiveDate>>,
    ) -> Self {
        debug_assert!(trading_days > 0);
        debug_assert_eq!(values.len() % trading_days, 0);
        if let Some(dates) = &start_dates {
            debug_assert_eq!(dates.len(), values.len() / trading_days);
        }
        Self {
            method,
            trading_days,
            values,
            start_dates,
        }
    }

    pub fn method(&self) -> SimulationMethod {
        self.method
    }

    /// Length of every path.
    pub fn trading_days(&self) -> usize {
        self.trading_days
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.values.len() / self.trading_days
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn path(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.trading_days)?;
        self.values.get(start..start + self.trading_days)
    }

    pub fn paths(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.trading_days)
    }

    /// Calendar date of the first observation of path `index`, if anchored.
    pub fn start_date(&self, index: usize) -> Option<NaiveDate> {
        self.start_dates.as_ref()?.get(index).copied()
    }

    pub fn start_dates(&self) -> Option<&[NaiveDate]> {
        self.start_dates.as_deref()
    }

    /// Total exchange-rate change of every path: the plain sum of its
    /// returns, not compounded.
    pub fn total_changes(&self) -> Vec<f64> {
        self.paths().map(|p| p.iter().sum()).collect()
    }

    /// Terminal exchange rate of every path started at `start_exchange_rate`.
    pub fn final_exchange_rates(&self, start_exchange_rate: f64) -> Vec<f64> {
        self.paths()
            .map(|p| start_exchange_rate + p.iter().sum::<f64>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> ResampledPathSet {
        ResampledPathSet::new(
            SimulationMethod::Bootstrap,
            2,
            vec![0.1, 0.2, -0.1, 0.05, 0.0, 0.0],
            None,
        )
    }

    #[test]
    fn test_shape() {
        let set = sample_set();
        assert_eq!(set.len(), 3);
        assert_eq!(set.path(1), Some(&[-0.1, 0.05][..]));
        assert_eq!(set.path(3), None);
        assert_eq!(set.paths().count(), 3);
        assert_eq!(set.start_date(0), None);
    }

    #[test]
    fn test_total_changes_are_summed() {
        let changes = sample_set().total_changes();
        assert!((changes[0] - 0.3).abs() < 1e-12);
        assert!((changes[1] + 0.05).abs() < 1e-12);
        assert_eq!(changes[2], 0.0);
    }

    #[test]
    fn test_final_exchange_rates() {
        let rates = sample_set().final_exchange_rates(1.0);
        assert!((rates[0] - 1.3).abs() < 1e-12);
        assert_eq!(rates[2], 1.0);
    }

    #[test]
    fn test_deserialize_rejects_ragged_paths() {
        let ragged = r#"{"method":"bootstrap","trading_days":2,"values":[0.1,0.2,0.3],"start_dates":null}"#;
        assert!(serde_json::from_str::<ResampledPathSet>(ragged).is_err());

        let empty_window = r#"{"method":"bootstrap","trading_days":0,"values":[],"start_dates":null}"#;
        assert!(serde_json::from_str::<ResampledPathSet>(empty_window).is_err());

        let wrong_dates = r#"{"method":"historical","trading_days":1,"values":[0.1,0.2],"start_dates":["2020-01-01"]}"#;
        assert!(serde_json::from_str::<ResampledPathSet>(wrong_dates).is_err());

        let json = serde_json::to_string(&sample_set()).unwrap();
        assert_eq!(serde_json::from_str::<ResampledPathSet>(&json).unwrap(), sample_set());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("historical".parse::<SimulationMethod>(), Ok(SimulationMethod::Historical));
        assert_eq!("bootstrapped".parse::<SimulationMethod>(), Ok(SimulationMethod::Bootstrap));
        assert!("garch".parse::<SimulationMethod>().is_err());
        assert_eq!(SimulationMethod::Bootstrap.to_string(), "bootstrap");
    }
}
