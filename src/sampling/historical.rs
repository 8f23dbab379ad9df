//! Historical one-year windows.
//!
//! Every contiguous window of the return series becomes one path, so the
//! paths overlap and each is anchored at the date it starts on.

use crate::core::error::{Result, SimulationError};
use crate::core::series::ReturnSeries;
use crate::sampling::paths::{ResampledPathSet, SimulationMethod};

/// Slice `series` into all windows of `trading_days` consecutive returns.
///
/// Path `i` is `series[i..i + trading_days]` for `i` in `0..N - trading_days`,
/// labelled with the date of observation `i`.
///
/// # Errors
///
/// - [`SimulationError::InvalidParameter`] if `trading_days` is zero.
/// - [`SimulationError::InsufficientData`] if the series is not longer than
///   `trading_days`.
pub fn generate_historical(series: &ReturnSeries, trading_days: usize) -> Result<ResampledPathSet> {
    if trading_days == 0 {
        return Err(SimulationError::invalid(
            "trading_days",
            trading_days,
            "must be positive",
        ));
    }
    let n = series.len();
    if n <= trading_days {
        return Err(SimulationError::InsufficientData {
            required: trading_days,
            available: n,
        });
    }

    let k = n - trading_days;
    let returns = series.values();
    let mut values = Vec::with_capacity(k * trading_days);
    for start in 0..k {
        values.extend_from_slice(&returns[start..start + trading_days]);
    }
    let start_dates = series.dates()[..k].to_vec();

    log::debug!(
        "generated {} historical paths of {} trading days from {} observations",
        k,
        trading_days,
        n
    );
    Ok(ResampledPathSet::new(
        SimulationMethod::Historical,
        trading_days,
        values,
        Some(start_dates),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(n: usize) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(1999, 1, 4).unwrap();
        ReturnSeries::from_daily(start, (0..n).map(|i| i as f64 / 100.0).collect()).unwrap()
    }

    #[test]
    fn test_window_count_and_contents() {
        let s = series(10);
        let set = generate_historical(&s, 4).unwrap();
        assert_eq!(set.len(), 6);
        assert_eq!(set.trading_days(), 4);
        for i in 0..6 {
            assert_eq!(set.path(i).unwrap(), &s.values()[i..i + 4]);
            assert_eq!(set.start_date(i), Some(s.dates()[i]));
        }
        assert_eq!(set.method(), SimulationMethod::Historical);
    }

    #[test]
    fn test_last_observation_never_starts_a_path() {
        let s = series(5);
        let set = generate_historical(&s, 4).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.path(0).unwrap(), &s.values()[0..4]);
    }

    #[test]
    fn test_series_equal_to_window_is_insufficient() {
        let result = generate_historical(&series(4), 4);
        assert!(matches!(
            result,
            Err(SimulationError::InsufficientData {
                required: 4,
                available: 4
            })
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            generate_historical(&series(4), 0),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }
}
