//! Historical-window simulation over a small scenario grid.
//!
//! Builds a synthetic EUR/USD price history with a few missing fixings,
//! cleans it into log returns and evaluates every (leverage, allocation)
//! scenario on all one-year historical windows.

use chrono::{Duration, NaiveDate};
use swap_payout_sim::analysis::summary::{summarize, SummaryReport};
use swap_payout_sim::core::series::{PriceObservation, PriceSeries};
use swap_payout_sim::sampling::historical::generate_historical;
use swap_payout_sim::scenario::grid::ScenarioGrid;
use swap_payout_sim::scenario::runner::ScenarioRunner;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  swap-payout-sim: Historical Windows Example  ║");
    println!("╚══════════════════════════════════════════════╝\n");

    // --- Price history: a slow cycle around 1.15, every 97th fixing missing ---
    let start = NaiveDate::from_ymd_opt(2012, 1, 2).ok_or("invalid start date")?;
    let observations: Vec<PriceObservation> = (0..1_500)
        .map(|i| {
            let t = i as f64;
            let price = 1.15 + 0.12 * (t / 160.0).sin() + 0.01 * (t / 7.0).cos();
            PriceObservation {
                date: start + Duration::days(i),
                price: if i % 97 == 50 { None } else { Some(price) },
            }
        })
        .collect();
    let prices = PriceSeries::new(observations)?;
    println!("Price fixings:     {}", prices.len());
    println!("Missing fixings:   {}", prices.missing_count());

    let returns = prices.interpolate_gaps(2)?.log_returns()?;
    println!("Log returns:       {}\n", returns.len());

    // --- One-year windows ---
    let paths = generate_historical(&returns, 252)?;
    println!("Historical paths:  {}", paths.len());
    if let (Some(first), Some(last)) = (paths.start_date(0), paths.start_date(paths.len() - 1)) {
        println!("Window starts:     {} … {}\n", first, last);
    }

    // --- Scenario grid ---
    let grid = ScenarioGrid::new(vec![3.0, 5.0, 10.0], vec![0.0, 0.5, 1.0])?;
    let table = ScenarioRunner::new(grid).run(&paths)?;
    println!(
        "Evaluated {} scenarios × {} paths = {} payout records\n",
        table.scenario_count(),
        table.path_count(),
        table.records().len()
    );

    let summaries = summarize(&table);
    println!("{}", SummaryReport(&summaries));
    Ok(())
}
