use super::cli_utils;
use super::lookup::{FieldStats, LookupEngine, LookupError, QueryResult};

use std::io::{self, BufRead};
use std::time;

use log::{info, warn};

use failure::Fail;

const HEADER: [&str; 11] = [
    "query",
    "status",
    "records_count",
    "property_min",
    "property_median",
    "property_max",
    "tarif_min",
    "tarif_median",
    "tarif_max",
    "insurance_type",
    "insurer",
];

#[derive(Debug, Default, PartialEq)]
pub struct BatchStats {
    pub total_lines: u32,
    pub not_found_lines: u32,
    pub invalid_lines: u32,
}

#[derive(Debug, Fail)]
pub enum BatchError {
    #[fail(display = "I/O error: {}", _0)]
    Io(io::Error),
    #[fail(display = "Csv error: {}", _0)]
    Csv(csv::Error),
}

impl From<io::Error> for BatchError {
    fn from(err: io::Error) -> BatchError {
        BatchError::Io(err)
    }
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> BatchError {
        BatchError::Csv(err)
    }
}

fn push_stats(stats: &FieldStats, row: &mut Vec<String>) {
    match stats {
        FieldStats::Available { min, median, max } => {
            row.push(min.to_string());
            row.push(median.to_string());
            row.push(max.to_string());
        }
        FieldStats::NoNumericData => {
            for _ in 0..3 {
                row.push(String::new());
            }
        }
    }
}

fn result_row(query: &str, outcome: &Result<QueryResult, LookupError>) -> Vec<String> {
    let mut row = vec![query.to_owned()];

    match outcome.as_ref().map(QueryResult::summary) {
        Err(LookupError::InvalidQuery(_)) => row.push("invalid".to_owned()),
        Ok(None) => row.push("not_found".to_owned()),
        Ok(Some(summary)) => {
            row.push("found".to_owned());
            row.push(summary.records_count.to_string());
            push_stats(&summary.property, &mut row);
            push_stats(&summary.tarif, &mut row);
            row.push(summary.insurance_type_mode.clone().unwrap_or_default());
            row.push(summary.insurer_mode.clone().unwrap_or_default());
        }
    }

    row.resize(HEADER.len(), String::new());
    row
}

/// Looks up every line of `input` and writes one CSV row per query.
pub fn batch_lookup(
    engine: &LookupEngine,
    input_file: &mut dyn io::Read,
    file_size: Option<u64>,
    output_file: &mut dyn io::Write,
    delimiter: u8,
    quiet: bool,
) -> Result<BatchStats, BatchError> {
    let progress_bar = cli_utils::create_progress_bar_bytes(quiet, "Looking up...", file_size);

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(output_file);
    csv_writer.write_record(&HEADER)?;

    let mut stats = BatchStats::default();
    let start_instant = time::Instant::now();

    for (line_number, line_result) in io::BufReader::new(input_file).lines().enumerate() {
        let line = match line_result {
            Ok(line) => line,
            Err(e) => {
                warn!("Unable to read line {}: {}", line_number + 1, e);
                continue;
            }
        };
        stats.total_lines += 1;

        let query = line.trim();
        let outcome = engine.lookup(query);
        match outcome {
            Err(_) => stats.invalid_lines += 1,
            Ok(QueryResult::NotFound { .. }) => stats.not_found_lines += 1,
            Ok(QueryResult::Found { .. }) => {}
        }

        csv_writer.write_record(&result_row(query, &outcome))?;
        progress_bar.inc(line.len() as u64 + 1);
    }

    csv_writer.flush()?;
    progress_bar.finish();

    let elapsed_secs = start_instant.elapsed().as_millis() as f32 / 1000.0f32;
    info!(
        "Looked up {} queries in {} seconds. Avg: {} queries/sec",
        stats.total_lines,
        elapsed_secs,
        (stats.total_lines as f32) / elapsed_secs.max(0.001)
    );

    Ok(stats)
}
