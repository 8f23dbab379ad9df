//! Stationary block bootstrap (Politis & Romano, 1994).
//!
//! Paths are stitched together from blocks of the historical series whose
//! lengths are geometrically distributed. Blocks start uniformly at random
//! and wrap around the end of the series, so every observation is equally
//! likely to appear and short-range serial dependence is kept inside each
//! block.

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimulationError};
use crate::core::series::ReturnSeries;
use crate::sampling::block_length::optimal_block_length;
use crate::sampling::paths::{ResampledPathSet, SimulationMethod};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Geometric};

/// A configured stationary bootstrap.
///
/// The same configuration applied to the same data always yields the same
/// paths: all randomness comes from one generator seeded with `seed`.
#[derive(Debug, Clone, PartialEq)]
pub struct StationaryBootstrap {
    mean_block_length: f64,
    trading_days: usize,
    replications: usize,
    seed: u64,
}

impl StationaryBootstrap {
    pub fn new(
        mean_block_length: f64,
        trading_days: usize,
        replications: usize,
        seed: u64,
    ) -> Result<Self> {
        if !(mean_block_length.is_finite() && mean_block_length >= 1.0) {
            return Err(SimulationError::invalid(
                "mean_block_length",
                mean_block_length,
                "must be at least 1",
            ));
        }
        if trading_days == 0 {
            return Err(SimulationError::invalid(
                "trading_days",
                trading_days,
                "must be positive",
            ));
        }
        if replications == 0 {
            return Err(SimulationError::invalid(
                "bootstrap_replications",
                replications,
                "must be positive",
            ));
        }
        Ok(Self {
            mean_block_length,
            trading_days,
            replications,
            seed,
        })
    }

    /// Configure from a simulation config, estimating the mean block length
    /// from `series`.
    pub fn from_config(series: &ReturnSeries, config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let block = optimal_block_length(series.values()).stationary;
        Self::new(
            block,
            config.trading_days,
            config.bootstrap_replications,
            config.simulation_seed,
        )
    }

    pub fn mean_block_length(&self) -> f64 {
        self.mean_block_length
    }

    pub fn trading_days(&self) -> usize {
        self.trading_days
    }

    pub fn replications(&self) -> usize {
        self.replications
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw `replications` paths of `trading_days` returns from `data`.
    pub fn resample(&self, data: &[f64]) -> Result<ResampledPathSet> {
        let n = data.len();
        if n < 2 {
            return Err(SimulationError::InsufficientData {
                required: 1,
                available: n,
            });
        }
        let block_lengths = Geometric::new(1.0 / self.mean_block_length).map_err(|_| {
            SimulationError::invalid(
                "mean_block_length",
                self.mean_block_length,
                "does not define a geometric distribution",
            )
        })?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut values = Vec::with_capacity(self.replications * self.trading_days);
        for _ in 0..self.replications {
            let mut filled = 0;
            while filled < self.trading_days {
                let start = rng.gen_range(0..n);
                // Geometric counts failures before the first success, so
                // 1 + draw has mean `mean_block_length`.
                let remaining = (self.trading_days - filled) as u64;
                let block = block_lengths
                    .sample(&mut rng)
                    .saturating_add(1)
                    .min(remaining) as usize;
                values.extend((start..start + block).map(|i| data[i % n]));
                filled += block;
            }
        }

        log::debug!(
            "bootstrapped {} paths of {} trading days (mean block {:.2}, seed {})",
            self.replications,
            self.trading_days,
            self.mean_block_length,
            self.seed
        );
        Ok(ResampledPathSet::new(
            SimulationMethod::Bootstrap,
            self.trading_days,
            values,
            None,
        ))
    }
}

/// Stationary-bootstrap `replications` one-year paths from `series`.
///
/// The expected block length is estimated from the series with
/// [`optimal_block_length`]; the generator is seeded with `seed`.
pub fn generate_bootstrap(
    series: &ReturnSeries,
    trading_days: usize,
    replications: usize,
    seed: u64,
) -> Result<ResampledPathSet> {
    let block = optimal_block_length(series.values()).stationary;
    log::info!(
        "stationary bootstrap: {} observations, optimal mean block length {:.2}",
        series.len(),
        block
    );
    StationaryBootstrap::new(block, trading_days, replications, seed)?.resample(series.values())
}
