use crate::core::error::{Result, SimulationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One dated daily log return of the EUR/USD rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnObservation {
    pub date: NaiveDate,
    pub log_return: f64,
}

/// Cleaned, chronologically ordered daily log-return series.
///
/// This is the shared input of every sample generator. It is immutable once
/// built: dates are strictly increasing and every return is finite.
///
/// # Examples
///
/// ```
/// use swap_payout_sim::core::series::ReturnSeries;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(1999, 1, 4).unwrap();
/// let series = ReturnSeries::from_daily(start, vec![0.001, -0.002, 0.0005]).unwrap();
/// assert_eq!(series.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReturnSeriesFields")]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

/// Serialized shape of [`ReturnSeries`], validated on the way in.
#[derive(Deserialize)]
struct ReturnSeriesFields {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TryFrom<ReturnSeriesFields> for ReturnSeries {
    type Error = SimulationError;

    fn try_from(fields: ReturnSeriesFields) -> Result<Self> {
        Self::from_parts(fields.dates, fields.values)
    }
}

impl ReturnSeries {
    /// Build a series from dated observations.
    pub fn new(observations: Vec<ReturnObservation>) -> Result<Self> {
        let (dates, values) = observations
            .into_iter()
            .map(|o| (o.date, o.log_return))
            .unzip();
        Self::from_parts(dates, values)
    }

    /// Build a series from parallel date and return vectors.
    pub fn from_parts(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(SimulationError::InvalidSeries(format!(
                "{} dates but {} returns",
                dates.len(),
                values.len()
            )));
        }
        if dates.is_empty() {
            return Err(SimulationError::InvalidSeries(
                "series has no observations".to_string(),
            ));
        }
        if let Some(w) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SimulationError::InvalidSeries(format!(
                "dates must be strictly increasing, found {} after {}",
                w[1], w[0]
            )));
        }
        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(SimulationError::InvalidSeries(format!(
                "non-finite return {} on {}",
                v, dates[i]
            )));
        }
        Ok(Self { dates, values })
    }

    /// Build a series of consecutive calendar days starting at `start`.
    ///
    /// Handy for synthetic data where only the ordering matters.
    pub fn from_daily(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = start
            .iter_days()
            .take(values.len())
            .collect::<Vec<_>>();
        Self::from_parts(dates, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The log returns, in date order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn get(&self, index: usize) -> Option<ReturnObservation> {
        Some(ReturnObservation {
            date: *self.dates.get(index)?,
            log_return: *self.values.get(index)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = ReturnObservation> + '_ {
        self.dates
            .iter()
            .zip(&self.values)
            .map(|(&date, &log_return)| ReturnObservation { date, log_return })
    }
}

/// One daily price quote; `None` marks a missing fixing (e.g. a holiday).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub price: Option<f64>,
}

/// Raw daily EUR/USD fixings before cleaning.
///
/// Cleaning fills short gaps by interpolating in calendar time, then the
/// cleaned prices are turned into a [`ReturnSeries`] of log returns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PriceSeriesFields")]
pub struct PriceSeries {
    observations: Vec<PriceObservation>,
}

#[derive(Deserialize)]
struct PriceSeriesFields {
    observations: Vec<PriceObservation>,
}

impl TryFrom<PriceSeriesFields> for PriceSeries {
    type Error = SimulationError;

    fn try_from(fields: PriceSeriesFields) -> Result<Self> {
        Self::new(fields.observations)
    }
}

impl PriceSeries {
    pub fn new(observations: Vec<PriceObservation>) -> Result<Self> {
        if let Some(w) = observations.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(SimulationError::InvalidSeries(format!(
                "dates must be strictly increasing, found {} after {}",
                w[1].date, w[0].date
            )));
        }
        for obs in &observations {
            if let Some(p) = obs.price {
                if !(p.is_finite() && p > 0.0) {
                    return Err(SimulationError::InvalidSeries(format!(
                        "price must be positive, got {} on {}",
                        p, obs.date
                    )));
                }
            }
        }
        Ok(Self { observations })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    /// Number of missing fixings.
    pub fn missing_count(&self) -> usize {
        self.observations.iter().filter(|o| o.price.is_none()).count()
    }

    /// Fill runs of at most `limit` consecutive missing prices.
    ///
    /// Each gap is filled linearly in calendar days between the two
    /// bracketing quotes. Longer runs and gaps at either end of the series
    /// cannot be filled and fail with [`SimulationError::MissingData`].
    pub fn interpolate_gaps(&self, limit: usize) -> Result<PriceSeries> {
        let mut filled = self.observations.clone();
        let mut i = 0;
        while i < filled.len() {
            if filled[i].price.is_some() {
                i += 1;
                continue;
            }
            let gap_start = i;
            while i < filled.len() && filled[i].price.is_none() {
                i += 1;
            }
            let gap_len = i - gap_start;

            if gap_start == 0 || i == filled.len() {
                return Err(SimulationError::MissingData(format!(
                    "{} missing price(s) at the edge of the series starting {}",
                    gap_len, filled[gap_start].date
                )));
            }
            if gap_len > limit {
                return Err(SimulationError::MissingData(format!(
                    "{} consecutive missing prices starting {} exceed the interpolation limit {}",
                    gap_len, filled[gap_start].date, limit
                )));
            }

            let left = filled[gap_start - 1];
            let right = filled[i];
            let (Some(p0), Some(p1)) = (left.price, right.price) else {
                return Err(SimulationError::MissingData(format!(
                    "no bracketing quotes around {}",
                    filled[gap_start].date
                )));
            };
            let span = (right.date - left.date).num_days() as f64;
            for obs in &mut filled[gap_start..i] {
                let elapsed = (obs.date - left.date).num_days() as f64;
                obs.price = Some(p0 + (p1 - p0) * elapsed / span);
            }
        }
        log::debug!(
            "interpolated {} missing price(s) with limit {}",
            self.missing_count(),
            limit
        );
        Ok(PriceSeries { observations: filled })
    }

    /// Daily log returns `ln(p_t / p_{t-1})`, dated at `t`.
    ///
    /// The first quote has no predecessor and produces no return. Any
    /// remaining missing price is an error; call
    /// [`interpolate_gaps`](Self::interpolate_gaps) first.
    pub fn log_returns(&self) -> Result<ReturnSeries> {
        let mut prices = Vec::with_capacity(self.observations.len());
        for obs in &self.observations {
            let price = obs.price.ok_or_else(|| {
                SimulationError::MissingData(format!("missing price on {}", obs.date))
            })?;
            prices.push((obs.date, price));
        }
        if prices.len() < 2 {
            return Err(SimulationError::InsufficientData {
                required: 1,
                available: prices.len(),
            });
        }
        let (dates, values) = prices
            .windows(2)
            .map(|w| (w[1].0, (w[1].1 / w[0].1).ln()))
            .unzip();
        ReturnSeries::from_parts(dates, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn test_series_rejects_unordered_dates() {
        let result = ReturnSeries::from_parts(vec![day(2), day(1)], vec![0.0, 0.0]);
        assert!(matches!(result, Err(SimulationError::InvalidSeries(_))));
    }

    #[test]
    fn test_series_rejects_duplicate_dates() {
        let result = ReturnSeries::from_parts(vec![day(1), day(1)], vec![0.0, 0.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_series_rejects_non_finite_returns() {
        let result = ReturnSeries::from_parts(vec![day(1), day(2)], vec![0.0, f64::NAN]);
        assert!(result.is_err());
    }

    #[test]
    fn test_series_rejects_empty() {
        assert!(ReturnSeries::new(Vec::new()).is_err());
    }

    #[test]
    fn test_series_from_daily() {
        let series = ReturnSeries::from_daily(day(1), vec![0.01, 0.02, 0.03]).unwrap();
        assert_eq!(series.dates(), &[day(1), day(2), day(3)]);
        assert_eq!(series.get(1).unwrap().log_return, 0.02);
        assert!(series.get(3).is_none());
    }

    #[test]
    fn test_log_returns_drop_first_quote() {
        let prices = PriceSeries::new(vec![
            PriceObservation { date: day(1), price: Some(1.0) },
            PriceObservation { date: day(2), price: Some(1.1) },
            PriceObservation { date: day(3), price: Some(1.0) },
        ])
        .unwrap();
        let returns = prices.log_returns().unwrap();
        assert_eq!(returns.len(), 2);
        assert_eq!(returns.dates()[0], day(2));
        assert_relative_eq!(returns.values()[0], 1.1f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(returns.values()[1], (1.0f64 / 1.1).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_interpolation_is_time_weighted() {
        // Quotes on the 1st and 5th, missing on the 2nd and 4th (3rd absent entirely).
        let prices = PriceSeries::new(vec![
            PriceObservation { date: day(1), price: Some(1.0) },
            PriceObservation { date: day(2), price: None },
            PriceObservation { date: day(4), price: None },
            PriceObservation { date: day(5), price: Some(1.4) },
        ])
        .unwrap();
        let filled = prices.interpolate_gaps(2).unwrap();
        assert_eq!(filled.missing_count(), 0);
        assert_relative_eq!(filled.observations()[1].price.unwrap(), 1.1, epsilon = 1e-12);
        assert_relative_eq!(filled.observations()[2].price.unwrap(), 1.3, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolation_limit_exceeded() {
        let prices = PriceSeries::new(vec![
            PriceObservation { date: day(1), price: Some(1.0) },
            PriceObservation { date: day(2), price: None },
            PriceObservation { date: day(3), price: None },
            PriceObservation { date: day(4), price: None },
            PriceObservation { date: day(5), price: Some(1.4) },
        ])
        .unwrap();
        assert!(matches!(
            prices.interpolate_gaps(2),
            Err(SimulationError::MissingData(_))
        ));
    }

    #[test]
    fn test_interpolation_rejects_leading_gap() {
        let prices = PriceSeries::new(vec![
            PriceObservation { date: day(1), price: None },
            PriceObservation { date: day(2), price: Some(1.0) },
        ])
        .unwrap();
        assert!(prices.interpolate_gaps(2).is_err());
    }

    #[test]
    fn test_log_returns_require_clean_prices() {
        let prices = PriceSeries::new(vec![
            PriceObservation { date: day(1), price: Some(1.0) },
            PriceObservation { date: day(2), price: None },
            PriceObservation { date: day(3), price: Some(1.0) },
        ])
        .unwrap();
        assert!(prices.log_returns().is_err());
    }

    #[test]
    fn test_deserialize_validates_series() {
        let unordered = r#"{"dates":["2020-01-02","2020-01-01"],"values":[0.1,0.2]}"#;
        assert!(serde_json::from_str::<ReturnSeries>(unordered).is_err());

        let mismatched = r#"{"dates":["2020-01-02"],"values":[0.1,0.2,0.3]}"#;
        assert!(serde_json::from_str::<ReturnSeries>(mismatched).is_err());

        let series = ReturnSeries::from_daily(day(1), vec![0.1, -0.2]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(serde_json::from_str::<ReturnSeries>(&json).unwrap(), series);
    }

    #[test]
    fn test_deserialize_validates_prices() {
        let json = r#"{"observations":[{"date":"2020-01-01","price":-1.0}]}"#;
        assert!(serde_json::from_str::<PriceSeries>(json).is_err());
        let json = r#"{"observations":[{"date":"2020-01-01","price":1.1},{"date":"2020-01-02","price":null}]}"#;
        assert_eq!(serde_json::from_str::<PriceSeries>(json).unwrap().missing_count(), 1);
    }

    #[test]
    fn test_price_series_rejects_non_positive_price() {
        let result = PriceSeries::new(vec![PriceObservation {
            date: day(1),
            price: Some(0.0),
        }]);
        assert!(result.is_err());
    }
}
