//! Summary statistics over the loaded table.
//!
//! Every sensor is computed independently and handed back as its own
//! `Result`, so one broken column never takes the rest of the summary down.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use super::filter::evaluated_rows;
use super::model::{CellValue, LoggerTable};
use super::time::{format_duration, TimestampMatcher};
use crate::error::StatsError;

/// Mean, extrema and spread of one sensor column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorStats {
    pub sensor: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n - 1); NaN for a single value.
    pub stdev: f64,
    pub count: usize,
}

/// Outcome of one sensor's computation.
pub type SensorOutcome = (String, Result<SensorStats, StatsError>);

/// First and last timestamps of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSpan {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
    /// The last timestamp exactly as logged, used for output names.
    pub last_raw: String,
}

impl RunSpan {
    /// Read the span from the timestamp column.
    pub fn from_table(
        table: &LoggerTable,
        timestamp_column: &str,
        matcher: &TimestampMatcher,
    ) -> Result<Self, StatsError> {
        let column = table
            .column(timestamp_column)
            .ok_or_else(|| StatsError::NoValues(timestamp_column.to_string()))?;
        let first_raw = column
            .first_text()
            .ok_or_else(|| StatsError::NoValues(timestamp_column.to_string()))?;
        let last_raw = column
            .last_text()
            .ok_or_else(|| StatsError::NoValues(timestamp_column.to_string()))?;

        let first = matcher
            .parse(&first_raw)
            .ok_or_else(|| StatsError::BadTimestamp(first_raw.clone()))?;
        let last = matcher
            .parse(&last_raw)
            .ok_or_else(|| StatsError::BadTimestamp(last_raw.clone()))?;

        Ok(RunSpan {
            first,
            last,
            last_raw,
        })
    }

    pub fn duration(&self) -> Duration {
        self.last - self.first
    }
}

/// Statistics for one sensor over rows `[skip..]`.
pub fn sensor_stats(table: &LoggerTable, sensor: &str, skip: usize) -> Result<SensorStats, StatsError> {
    let column = table
        .column(sensor)
        .ok_or_else(|| StatsError::NoValues(sensor.to_string()))?;

    let mut values = Vec::with_capacity(column.cells.len());
    for cell in &column.cells[evaluated_rows(column.cells.len(), skip)] {
        match cell {
            CellValue::Null => {}
            CellValue::Text(t) => {
                return Err(StatsError::NonNumeric {
                    sensor: sensor.to_string(),
                    value: t.clone(),
                })
            }
            // Logged `nan`/`inf` count as missing readings.
            other => values.extend(other.as_f64().filter(|v| v.is_finite())),
        }
    }

    if values.is_empty() {
        return Err(StatsError::NoValues(sensor.to_string()));
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let stdev = if count > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Ok(SensorStats {
        sensor: sensor.to_string(),
        mean,
        min,
        max,
        stdev,
        count,
    })
}

/// Run [`sensor_stats`] for each sensor, keeping every outcome.
pub fn compute_sensor_stats(table: &LoggerTable, sensors: &[String], skip: usize) -> Vec<SensorOutcome> {
    sensors
        .iter()
        .map(|s| (s.clone(), sensor_stats(table, s, skip)))
        .collect()
}

// ---------------------------------------------------------------------------
// StatisticsSummary
// ---------------------------------------------------------------------------

/// The accepted per-sensor statistics plus the run duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSummary {
    pub sensors: Vec<SensorStats>,
    /// Rendered as `H:MM:SS` or `N days, H:MM:SS`.
    pub duration: String,
    pub duration_seconds: i64,
    pub equilibration_skip: usize,
}

impl StatisticsSummary {
    /// Keep the successful outcomes; return the failures alongside.
    pub fn collect(
        span: &RunSpan,
        outcomes: Vec<SensorOutcome>,
        equilibration_skip: usize,
    ) -> (Self, Vec<(String, StatsError)>) {
        let mut sensors = Vec::new();
        let mut failures = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(stats) => sensors.push(stats),
                Err(e) => failures.push((name, e)),
            }
        }

        let duration = span.duration();
        let summary = StatisticsSummary {
            sensors,
            duration: format_duration(duration),
            duration_seconds: duration.num_seconds(),
            equilibration_skip,
        };
        (summary, failures)
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

/// Two-decimal rendering used by every statistics output.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:.2}")
    }
}

/// Quartiles of already sorted values, linearly interpolated.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
