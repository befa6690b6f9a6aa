//! Loading the historical sea-level series used to train the ensemble.
//!
//! Raw measurements (several per year in the satellite altimetry tables) are
//! averaged per calendar year and rebased so the reference year reads zero.
//! When the table cannot be used, a deterministic synthetic series stands in
//! so the service can still start.
use std::collections::BTreeMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::config::LoaderConfig;
use crate::error::DataError;

/// First year of satellite altimetry; every series is rebased to it.
pub const REFERENCE_YEAR: i32 = 1993;

const SYNTHETIC_LAST_YEAR: i32 = 2021;
const SYNTHETIC_RISE_PER_YEAR_MM: f64 = 3.4;

/// Sea level for one calendar year, relative to the reference year (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub year: i32,
    pub relative_rise: f64,
}

impl HistoricalPoint {
    pub fn new(year: i32, relative_rise: f64) -> Self {
        Self {
            year,
            relative_rise,
        }
    }
}

/// Split a series into parallel feature/target vectors.
pub fn split_series(points: &[HistoricalPoint]) -> (Vec<i32>, Vec<f64>) {
    points.iter().map(|p| (p.year, p.relative_rise)).unzip()
}

/// Load and rebase the historical series, failing on any problem.
pub fn load_historical_series<P: AsRef<Path>>(
    path: P,
    config: &LoaderConfig,
) -> Result<Vec<HistoricalPoint>, DataError> {
    let path = path.as_ref();
    let is_tsv = path.extension().map(|e| e == "tsv").unwrap_or(false);
    let delimiter = if is_tsv { b'\t' } else { b',' };

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| DataError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = rdr.headers()?.clone();
    let year_idx = column_index(&headers, &config.year_column)?;
    let value_idx = column_index(&headers, &config.value_column)?;

    // year -> (sum, count)
    let mut yearly: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = result?;
        let year = record
            .get(year_idx)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|y| y.is_finite())
            .map(|y| y.floor() as i32);
        let value = record
            .get(value_idx)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite());

        match (year, value) {
            (Some(year), Some(value)) => {
                let entry = yearly.entry(year).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!(
            "Skipped {} rows without a usable '{}' / '{}' pair in {}",
            skipped,
            config.year_column,
            config.value_column,
            path.display()
        );
    }

    let averaged: Vec<(i32, f64)> = yearly
        .into_iter()
        .map(|(year, (sum, count))| (year, sum / count as f64))
        .collect();

    let series = rebase(&averaged, config.reference_year)?;
    log::info!(
        "Loaded {} yearly sea-level points ({}..={}) from {}",
        series.len(),
        series.first().map(|p| p.year).unwrap_or_default(),
        series.last().map(|p| p.year).unwrap_or_default(),
        path.display()
    );
    Ok(series)
}

/// Subtract the reference year's value from every yearly average.
///
/// `yearly` must already be sorted by year without duplicates.
pub fn rebase(
    yearly: &[(i32, f64)],
    reference_year: i32,
) -> Result<Vec<HistoricalPoint>, DataError> {
    if yearly.is_empty() {
        return Err(DataError::Empty);
    }

    let Some(&(_, reference)) = yearly.iter().find(|(year, _)| *year == reference_year) else {
        return Err(DataError::MissingReferenceYear(reference_year));
    };

    Ok(yearly
        .iter()
        .map(|&(year, value)| HistoricalPoint::new(year, value - reference))
        .collect())
}

/// Load the historical series, substituting [`synthetic_series`] on failure.
pub fn load_or_synthesize<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Vec<HistoricalPoint> {
    match load_historical_series(&path, config) {
        Ok(series) => series,
        Err(e) => {
            log::warn!(
                "Could not load sea-level data from {} ({}); using synthetic series",
                path.as_ref().display(),
                e
            );
            synthetic_series()
        }
    }
}

/// Linear stand-in series: 1993..=2021 rising 3.4 mm per year from zero.
pub fn synthetic_series() -> Vec<HistoricalPoint> {
    (REFERENCE_YEAR..=SYNTHETIC_LAST_YEAR)
        .enumerate()
        .map(|(i, year)| HistoricalPoint::new(year, i as f64 * SYNTHETIC_RISE_PER_YEAR_MM))
        .collect()
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, DataError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))
}
