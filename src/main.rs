//! swap-payout-sim CLI
//!
//! Simulate the payout distribution of EUR/USD swap certificates from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! # Clean a price history into daily log returns
//! swap-payout-sim returns --prices eurusd.csv --output returns.csv
//!
//! # Inspect the bootstrap block length of a return series
//! swap-payout-sim block-length --returns returns.csv
//!
//! # Run both simulation methods over the default scenario grid
//! swap-payout-sim simulate --returns returns.csv --out-dir results
//!
//! # Bootstrap only, custom grid, summary as JSON
//! swap-payout-sim simulate --returns returns.csv --config run.json --method bootstrap --format json
//! ```
//!
//! Set `RUST_LOG=info` (or `debug`) to follow the pipeline on stderr.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use swap_payout_sim::analysis::summary::{summarize, ScenarioSummary, SummaryReport};
use swap_payout_sim::contract::swap::PayoutFormula;
use swap_payout_sim::core::config::RunConfig;
use swap_payout_sim::core::error::Result;
use swap_payout_sim::core::series::ReturnSeries;
use swap_payout_sim::io::tables::{
    read_price_series, read_return_series, write_path_dates, write_payout_table,
    write_return_series, write_summaries,
};
use swap_payout_sim::sampling::block_length::optimal_block_length;
use swap_payout_sim::sampling::bootstrap::StationaryBootstrap;
use swap_payout_sim::sampling::historical::generate_historical;
use swap_payout_sim::sampling::paths::{ResampledPathSet, SimulationMethod};
use swap_payout_sim::scenario::grid::ScenarioGrid;
use swap_payout_sim::scenario::records::PayoutTable;
use swap_payout_sim::scenario::runner::ScenarioRunner;

fn print_usage() {
    eprintln!(
        r#"swap-payout-sim — tail-risk simulation for EUR/USD swap certificates

USAGE:
    swap-payout-sim <COMMAND> [OPTIONS]

COMMANDS:
    returns         Convert a daily price history into log returns
    block-length    Estimate the optimal bootstrap block length of a return series
    simulate        Resample paths and evaluate the scenario grid
    help            Show this message

OPTIONS (returns):
    --prices <FILE>     CSV with columns date,price (empty price = missing)
    --limit <N>         Longest run of missing prices to interpolate (default: 2)
    --output <FILE>     Write to file instead of stdout

OPTIONS (block-length):
    --returns <FILE>    CSV with columns date,log_return

OPTIONS (simulate):
    --returns <FILE>    CSV with columns date,log_return
    --config <FILE>     JSON run configuration (default grid if omitted)
    --method <METHOD>   historical, bootstrap or both (default: both)
    --formula <NAME>    symmetric (default) or premium-split
    --seed <N>          Override the bootstrap seed
    --out-dir <DIR>     Write payout, metadata and summary tables here
    --format <FORMAT>   Summary output: text (default) or json

EXAMPLES:
    swap-payout-sim returns --prices eurusd.csv --output returns.csv
    swap-payout-sim block-length --returns returns.csv
    swap-payout-sim simulate --returns returns.csv --out-dir results
    swap-payout-sim simulate --returns returns.csv --method bootstrap --seed 42 --format json"#
    );
}

fn exit_on_error<T>(result: Result<T>, context: &str) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("Error {}: {}", context, e);
        process::exit(1);
    })
}

fn option_value(args: &[String], i: usize, flag: &str, expected: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, expected);
        process::exit(1);
    })
}

fn open_file(path: &str) -> File {
    File::open(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    })
}

fn load_returns(path: &str) -> ReturnSeries {
    exit_on_error(
        read_return_series(open_file(path)),
        &format!("parsing returns from '{}'", path),
    )
}

fn cmd_returns(args: &[String]) {
    let mut prices_path = None;
    let mut limit = 2usize;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--prices" => {
                i += 1;
                prices_path = Some(option_value(args, i, "--prices", "a file path"));
            }
            "--limit" => {
                i += 1;
                limit = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--limit requires a number");
                        process::exit(1);
                    });
            }
            "--output" => {
                i += 1;
                output_path = Some(option_value(args, i, "--output", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = prices_path.unwrap_or_else(|| {
        eprintln!("Error: --prices <FILE> is required");
        process::exit(1);
    });

    let prices = exit_on_error(
        read_price_series(open_file(&path)),
        &format!("parsing prices from '{}'", path),
    );
    let missing = prices.missing_count();
    let returns = exit_on_error(
        prices
            .interpolate_gaps(limit)
            .and_then(|cleaned| cleaned.log_returns()),
        "computing log returns",
    );

    if let Some(out) = output_path {
        let file = File::create(&out).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", out, e);
            process::exit(1);
        });
        exit_on_error(write_return_series(&returns, file), "writing returns");
        eprintln!(
            "Filled {} missing prices, wrote {} log returns → {}",
            missing,
            returns.len(),
            out
        );
    } else {
        exit_on_error(write_return_series(&returns, io::stdout()), "writing returns");
    }
}

fn cmd_block_length(args: &[String]) {
    let mut returns_path = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--returns" => {
                i += 1;
                returns_path = Some(option_value(args, i, "--returns", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = returns_path.unwrap_or_else(|| {
        eprintln!("Error: --returns <FILE> is required");
        process::exit(1);
    });

    let series = load_returns(&path);
    let estimate = optimal_block_length(series.values());
    println!("Observations:            {}", series.len());
    println!("Stationary bootstrap:    {:.4}", estimate.stationary);
    println!("Circular bootstrap:      {:.4}", estimate.circular);
}

fn parse_formula(name: &str) -> PayoutFormula {
    match name {
        "symmetric" => PayoutFormula::Symmetric,
        "premium-split" | "premium_split" => PayoutFormula::PremiumSplit,
        other => {
            eprintln!(
                "Unknown formula '{}': expected 'symmetric' or 'premium-split'",
                other
            );
            process::exit(1);
        }
    }
}

fn parse_methods(name: &str) -> Vec<SimulationMethod> {
    if name == "both" {
        return vec![SimulationMethod::Historical, SimulationMethod::Bootstrap];
    }
    match name.parse::<SimulationMethod>() {
        Ok(method) => vec![method],
        Err(e) => {
            eprintln!("{}: expected 'historical', 'bootstrap' or 'both'", e);
            process::exit(1);
        }
    }
}

fn generate_paths(
    method: SimulationMethod,
    series: &ReturnSeries,
    config: &RunConfig,
) -> Result<ResampledPathSet> {
    match method {
        SimulationMethod::Historical => {
            generate_historical(series, config.simulation.trading_days)
        }
        SimulationMethod::Bootstrap => {
            StationaryBootstrap::from_config(series, &config.simulation)?
                .resample(series.values())
        }
    }
}

fn write_method_tables(
    dir: &Path,
    method: SimulationMethod,
    paths: &ResampledPathSet,
    table: &PayoutTable,
    summaries: &[ScenarioSummary],
) -> Result<()> {
    let name = method.as_str();
    write_payout_table(table, dir, name)?;
    write_summaries(
        summaries,
        File::create(dir.join(format!("summary_payout_{}.csv", name)))?,
    )?;
    if paths.start_dates().is_some() {
        write_path_dates(
            paths,
            File::create(dir.join(format!("path_dates_{}.csv", name)))?,
        )?;
    }
    Ok(())
}

fn cmd_simulate(args: &[String]) {
    let mut returns_path = None;
    let mut config_path: Option<String> = None;
    let mut methods = "both".to_string();
    let mut formula = "symmetric".to_string();
    let mut seed: Option<u64> = None;
    let mut out_dir: Option<PathBuf> = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--returns" => {
                i += 1;
                returns_path = Some(option_value(args, i, "--returns", "a file path"));
            }
            "--config" => {
                i += 1;
                config_path = Some(option_value(args, i, "--config", "a file path"));
            }
            "--method" => {
                i += 1;
                methods = option_value(args, i, "--method", "'historical', 'bootstrap' or 'both'");
            }
            "--formula" => {
                i += 1;
                formula = option_value(args, i, "--formula", "'symmetric' or 'premium-split'");
            }
            "--seed" => {
                i += 1;
                seed = Some(
                    args.get(i)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(|| {
                            eprintln!("--seed requires a number");
                            process::exit(1);
                        }),
                );
            }
            "--out-dir" => {
                i += 1;
                out_dir = Some(PathBuf::from(option_value(
                    args,
                    i,
                    "--out-dir",
                    "a directory path",
                )));
            }
            "--format" => {
                i += 1;
                format = option_value(args, i, "--format", "'text' or 'json'");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = returns_path.unwrap_or_else(|| {
        eprintln!("Error: --returns <FILE> is required");
        process::exit(1);
    });

    let mut config = match &config_path {
        Some(p) => exit_on_error(RunConfig::load(p), &format!("loading config '{}'", p)),
        None => RunConfig::default(),
    };
    if let Some(seed) = seed {
        config.simulation.simulation_seed = seed;
    }

    let series = load_returns(&path);
    let grid = exit_on_error(
        ScenarioGrid::from_config(&config.scenario),
        "building scenario grid",
    );
    let runner = ScenarioRunner::new(grid).with_formula(parse_formula(&formula));

    let mut all_summaries = Vec::new();
    for method in parse_methods(&methods) {
        let paths = exit_on_error(
            generate_paths(method, &series, &config),
            &format!("generating {} paths", method),
        );
        let table = exit_on_error(runner.run(&paths), "evaluating scenarios");
        let summaries = summarize(&table);

        if let Some(dir) = &out_dir {
            exit_on_error(
                write_method_tables(dir, method, &paths, &table, &summaries),
                &format!("writing tables to '{}'", dir.display()),
            );
        }

        if format != "json" {
            println!("{}", SummaryReport(&summaries));
        }
        all_summaries.extend(summaries);
    }

    if format == "json" {
        let json = serde_json::to_string_pretty(&all_summaries).unwrap_or_else(|e| {
            eprintln!("Error serializing summary: {}", e);
            process::exit(1);
        });
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "returns" => cmd_returns(rest),
        "block-length" => cmd_block_length(rest),
        "simulate" => cmd_simulate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
