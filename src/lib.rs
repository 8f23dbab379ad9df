//! # swap-payout-sim
//!
//! Tail-risk simulation for collateralized EUR/USD currency-swap
//! certificates.
//!
//! A pair of leveraged certificates (EURlong and EURshort) is issued against
//! a shared pool of USD and euro deposits. This crate resamples one-year
//! exchange-rate paths from a historical return series, prices both legs of
//! the swap at the end of every path for a grid of leverage and collateral
//! allocations, and reports how often a leg pays out less than zero.
//!
//! ## Architecture
//!
//! - **core** — Return and price series, configuration, errors
//! - **contract** — The swap payout rule and its conservation check
//! - **sampling** — Historical windows, optimal block length, stationary bootstrap
//! - **scenario** — Scenario grid, parallel runner, payout records
//! - **analysis** — Negative-payout shares and per-scenario statistics
//! - **io** — CSV tables in and out

pub mod analysis;
pub mod contract;
pub mod core;
pub mod io;
pub mod sampling;
pub mod scenario;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::summary::{summarize, ScenarioSummary, SummaryReport};
    pub use crate::contract::swap::{payout_currency_swap, PayoutFormula, SwapContract, SwapPayout};
    pub use crate::core::config::{RunConfig, ScenarioConfig, SimulationConfig};
    pub use crate::core::error::{Result, SimulationError};
    pub use crate::core::series::{PriceSeries, ReturnSeries};
    pub use crate::sampling::block_length::{optimal_block_length, BlockLengthEstimate};
    pub use crate::sampling::bootstrap::{generate_bootstrap, StationaryBootstrap};
    pub use crate::sampling::historical::generate_historical;
    pub use crate::sampling::paths::{ResampledPathSet, SimulationMethod};
    pub use crate::scenario::grid::{ScenarioGrid, ScenarioId};
    pub use crate::scenario::records::{PayoutRecord, PayoutTable, RunMetadata};
    pub use crate::scenario::runner::{run_scenarios, ScenarioRunner, START_EXCHANGE_RATE};
}
