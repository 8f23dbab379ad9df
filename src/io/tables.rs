//! Flat CSV exchange with the data-acquisition and reporting collaborators.
//!
//! Inputs are `date,log_return` or `date,price` files (an empty price marks
//! a missing fixing). Outputs are the payout records, run metadata,
//! scenario summaries and historical path anchors, one CSV table each.

use crate::analysis::summary::ScenarioSummary;
use crate::core::error::Result;
use crate::core::series::{PriceObservation, PriceSeries, ReturnObservation, ReturnSeries};
use crate::sampling::paths::ResampledPathSet;
use crate::scenario::records::{PayoutRecord, PayoutTable, RunMetadata};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub fn read_return_series<R: Read>(reader: R) -> Result<ReturnSeries> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let observations = csv_reader
        .deserialize::<ReturnObservation>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    ReturnSeries::new(observations)
}

pub fn read_price_series<R: Read>(reader: R) -> Result<PriceSeries> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let observations = csv_reader
        .deserialize::<PriceObservation>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    PriceSeries::new(observations)
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_return_series<W: Write>(series: &ReturnSeries, writer: W) -> Result<()> {
    write_rows(writer, series.iter())
}

pub fn write_payout_records<W: Write>(records: &[PayoutRecord], writer: W) -> Result<()> {
    write_rows(writer, records)
}

pub fn write_run_metadata<W: Write>(metadata: &[RunMetadata], writer: W) -> Result<()> {
    write_rows(writer, metadata)
}

pub fn write_summaries<W: Write>(summaries: &[ScenarioSummary], writer: W) -> Result<()> {
    write_rows(writer, summaries)
}

#[derive(Serialize)]
struct PathAnchor {
    path_index: usize,
    start_date: NaiveDate,
}

/// Start date of every calendar-anchored path. Writes only the header row
/// for bootstrap path sets.
pub fn write_path_dates<W: Write>(paths: &ResampledPathSet, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(["path_index", "start_date"])?;
    for (path_index, &start_date) in paths.start_dates().unwrap_or(&[]).iter().enumerate() {
        csv_writer.serialize(PathAnchor {
            path_index,
            start_date,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Files written by [`write_payout_table`].
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenTables {
    pub payouts: PathBuf,
    pub metadata: PathBuf,
}

/// Write `simulated_payout_<name>.csv` and `metadata_payout_<name>.csv`
/// into `dir`, creating it if needed.
pub fn write_payout_table(table: &PayoutTable, dir: &Path, name: &str) -> Result<WrittenTables> {
    fs::create_dir_all(dir)?;
    let payouts = dir.join(format!("simulated_payout_{}.csv", name));
    let metadata = dir.join(format!("metadata_payout_{}.csv", name));
    write_payout_records(table.records(), File::create(&payouts)?)?;
    write_run_metadata(table.metadata(), File::create(&metadata)?)?;
    log::info!(
        "wrote {} payout records to {} and {} metadata rows to {}",
        table.records().len(),
        payouts.display(),
        table.metadata().len(),
        metadata.display()
    );
    Ok(WrittenTables { payouts, metadata })
}
