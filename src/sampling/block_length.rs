//! Data-driven block length for dependent-data bootstraps.
//!
//! Implements the automatic selector of Politis & White (2004) with the
//! correction of Patton, Politis & White (2009). The estimate trades the
//! bias of long overlapping blocks against the variance of short ones,
//! using a flat-top lag window over the sample autocovariances.

use serde::{Deserialize, Serialize};

/// Multiplier of the autocorrelation significance bound.
const SIGNIFICANCE_MULTIPLIER: f64 = 2.0;
/// Lower bound on the number of consecutive insignificant autocorrelations.
const MIN_INSIGNIFICANT_RUN: usize = 5;

/// Expected block lengths for the stationary and circular bootstraps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockLengthEstimate {
    pub stationary: f64,
    pub circular: f64,
}

impl BlockLengthEstimate {
    fn degenerate() -> Self {
        Self {
            stationary: 1.0,
            circular: 1.0,
        }
    }
}

/// Flat-top (trapezoidal) lag window.
fn flat_top(t: f64) -> f64 {
    let t = t.abs();
    if t <= 0.5 {
        1.0
    } else if t <= 1.0 {
        2.0 * (1.0 - t)
    } else {
        0.0
    }
}

/// Sample autocovariances of an already demeaned series for lags `0..=max_lag`.
fn autocovariances(eps: &[f64], max_lag: usize) -> Vec<f64> {
    let n = eps.len() as f64;
    (0..=max_lag)
        .map(|k| {
            eps[k..]
                .iter()
                .zip(&eps[..eps.len() - k])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n
        })
        .collect()
}

/// Estimate the optimal expected block length of `data`.
///
/// Deterministic in its input. Series too short to estimate anything, or
/// without variance, get a block length of 1 (an i.i.d. bootstrap). The
/// estimate is clamped to `[1, ceil(min(3 * sqrt(N), N / 3))]`.
pub fn optimal_block_length(data: &[f64]) -> BlockLengthEstimate {
    let n = data.len();
    if n < 3 {
        return BlockLengthEstimate::degenerate();
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    let eps: Vec<f64> = data.iter().map(|x| x - mean).collect();

    let run = MIN_INSIGNIFICANT_RUN.max(nf.log10().sqrt().ceil() as usize);
    let max_lag = (nf.sqrt().ceil() as usize + run).min(n - 1);
    let b_max = (3.0 * nf.sqrt()).min(nf / 3.0).ceil();
    let bound = SIGNIFICANCE_MULTIPLIER * (nf.log10() / nf).sqrt();

    let acv = autocovariances(&eps, max_lag);
    // Treat rounding noise around a constant series as zero variance.
    let scale = data.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if acv[0].is_nan() || acv[0].sqrt() <= 1e-12 * scale {
        return BlockLengthEstimate::degenerate();
    }
    let rho = |k: usize| acv[k] / acv[0];

    // Smallest lag m after which `run` consecutive autocorrelations are insignificant.
    let m_hat = (0..)
        .take_while(|m| m + run <= max_lag)
        .find(|&m| (m + 1..=m + run).all(|k| rho(k).abs() < bound));
    let bandwidth = match m_hat {
        Some(m) => (2 * m.max(1)).min(max_lag),
        None => max_lag,
    };

    let mut g = 0.0;
    let mut long_run_variance = acv[0];
    for (k, &r) in acv.iter().enumerate().take(bandwidth + 1).skip(1) {
        let weight = flat_top(k as f64 / bandwidth as f64);
        g += 2.0 * weight * k as f64 * r;
        long_run_variance += 2.0 * weight * r;
    }

    let d_stationary = 2.0 * long_run_variance.powi(2);
    let d_circular = 4.0 / 3.0 * long_run_variance.powi(2);
    let estimate = |d: f64| {
        let b = (2.0 * g * g / d).cbrt() * nf.cbrt();
        if b.is_finite() {
            b.clamp(1.0, b_max)
        } else {
            1.0
        }
    };

    let result = BlockLengthEstimate {
        stationary: estimate(d_stationary),
        circular: estimate(d_circular),
    };
    log::debug!(
        "optimal block length over {} observations: bandwidth {}, stationary {:.3}, circular {:.3}",
        n,
        bandwidth,
        result.stationary,
        result.circular
    );
    if result.stationary >= b_max {
        log::warn!(
            "stationary block length clamped to its maximum {} for {} observations",
            b_max,
            n
        );
    }
    result
}
