use std::io::Write;
use std::path::Path;

use super::create_file;
use crate::data::stats::{format_stat, StatisticsSummary};
use crate::error::ExportError;

pub const STATISTICS_HEADER: [&str; 6] = [
    "Sensor",
    "Mean [°C]",
    "Min [°C]",
    "Max [°C]",
    "Stdev [°C]",
    "duration",
];

/// Write one delimited row per sensor.
///
/// Nothing is written when no sensor made it into the summary; the return
/// value tells whether the file was created.
pub fn write_statistics(path: &Path, summary: &StatisticsSummary, separator: char) -> Result<bool, ExportError> {
    if summary.is_empty() {
        log::warn!("No sensor statistics to write");
        return Ok(false);
    }

    let delimiter = statistics_delimiter(separator);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(create_file(path)?);

    writer.write_record(STATISTICS_HEADER)?;
    for s in &summary.sensors {
        writer.write_record([
            s.sensor.clone(),
            format_stat(s.mean),
            format_stat(s.min),
            format_stat(s.max),
            format_stat(s.stdev),
            summary.duration.clone(),
        ])?;
    }
    writer.flush().map_err(|e| ExportError::from_io(path, e))?;
    Ok(true)
}

/// The separator as a single byte; non-ASCII characters fall back to tab.
fn statistics_delimiter(separator: char) -> u8 {
    if separator.is_ascii() {
        separator as u8
    } else {
        log::warn!("Statistics separator {separator:?} is not ASCII, using tab");
        b'\t'
    }
}

/// Machine-readable copy of the summary.
pub fn write_statistics_json(path: &Path, summary: &StatisticsSummary) -> Result<(), ExportError> {
    let mut out = create_file(path)?;
    serde_json::to_writer_pretty(&mut out, summary)?;
    out.flush().map_err(|e| ExportError::from_io(path, e))
}
