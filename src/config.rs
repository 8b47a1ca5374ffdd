use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::sanitize::SanitizerConfig;

/// File looked up in the working directory by the binary.
pub const CONFIG_FILE_NAME: &str = "logger-report.json";

// ---------------------------------------------------------------------------
// Content definitions
// ---------------------------------------------------------------------------

/// Names and markers the logger firmware writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentDefinitions {
    pub comment_marker: String,
    pub logger_id_column: String,
    pub timestamp_column: String,
    pub battery_voltage_column: String,
    /// Allow-list of recognized temperature sensors.
    pub sensors: Vec<String>,
    pub default_title: String,
    pub statistics_separator: char,
}

impl Default for ContentDefinitions {
    fn default() -> Self {
        Self {
            comment_marker: "#".to_string(),
            logger_id_column: "Logger-id".to_string(),
            timestamp_column: "Date_time".to_string(),
            battery_voltage_column: "Vbatt".to_string(),
            sensors: ["TMP1", "TMP2", "TMP3", "TMP4"].map(String::from).to_vec(),
            default_title: "TSV log data".to_string(),
            statistics_separator: '\t',
        }
    }
}

// ---------------------------------------------------------------------------
// Report configuration
// ---------------------------------------------------------------------------

/// Everything a run needs to know besides the input path.
///
/// Passed explicitly to [`crate::pipeline::run`]; tests build their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Open the viewer window once the files are written.
    pub show_interactive: bool,
    pub save_html: bool,
    pub save_statistics: bool,
    pub save_statistics_json: bool,
    pub write_png: bool,
    /// Full-table CSV, xlsx and Parquet copies.
    pub export_spreadsheets: bool,
    /// Drop data lines without a full ISO timestamp.
    pub validate_timestamps: bool,
    /// Leading rows left out of the statistics.
    pub equilibration_skip: usize,
    /// Defaults to the directory of the input file.
    pub output_dir: Option<PathBuf>,
    pub content: ContentDefinitions,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            show_interactive: true,
            save_html: true,
            save_statistics: true,
            save_statistics_json: false,
            write_png: false,
            export_spreadsheets: false,
            validate_timestamps: true,
            equilibration_skip: 0,
            output_dir: None,
            content: ContentDefinitions::default(),
        }
    }
}

impl ReportConfig {
    /// A configuration that only writes files, for batch use and tests.
    pub fn headless() -> Self {
        Self {
            show_interactive: false,
            ..Self::default()
        }
    }

    /// Read a JSON configuration; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// [`CONFIG_FILE_NAME`] in `dir` when present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::info!("Using configuration {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Whether any figure has to be built.
    pub fn wants_figures(&self) -> bool {
        self.show_interactive || self.save_html || self.write_png
    }

    pub fn sanitizer_config(&self) -> SanitizerConfig {
        SanitizerConfig {
            comment_marker: self.content.comment_marker.clone(),
            logger_id_marker: self.content.logger_id_column.clone(),
            timestamp_column: self.content.timestamp_column.clone(),
            validate_timestamps: self.validate_timestamps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{ "write_png": true, "content": { "sensors": ["T1"] } }"#).unwrap();
        assert!(config.write_png);
        assert!(config.save_html);
        assert_eq!(config.content.sensors, vec!["T1"]);
        assert_eq!(config.content.timestamp_column, "Date_time");
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ReportConfig::discover(dir.path()).unwrap(), ReportConfig::default());
    }

    #[test]
    fn sanitizer_follows_content_definitions() {
        let mut config = ReportConfig::headless();
        config.validate_timestamps = false;
        config.content.logger_id_column = "Device".into();
        let s = config.sanitizer_config();
        assert_eq!(s.logger_id_marker, "Device");
        assert!(!s.validate_timestamps);
    }
}
