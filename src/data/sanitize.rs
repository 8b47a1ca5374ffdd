//! Line-level repair of raw logger output.
//!
//! The logger re-emits its full header block every time the device restarts,
//! and rows written while power drops come out truncated or garbled. Before
//! the text is handed to the table parser, [`LineSanitizer::exclusions`]
//! decides which raw line indices must be dropped:
//!
//! ```text
//!  # comment                 -> always dropped
//!  Logger-id  Date_time ...  -> dropped (a later top header follows)
//!  Logger-id  Date_time ...  -> kept, last header before data
//!  L1  2023-01-01T00:00:00   -> data
//!  L1  2023-01-01T00:0       -> dropped, no full timestamp
//!  Logger-id  Date_time ...  -> dropped, restart after data
//!  L1  2023-01-01T00:05:00   -> data
//! ```

use std::collections::BTreeSet;

use super::time::TimestampMatcher;

/// Indices of raw lines to omit before structured parsing.
pub type ExclusionSet = BTreeSet<usize>;

/// Markers and switches the sanitizer works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizerConfig {
    pub comment_marker: String,
    pub logger_id_marker: String,
    pub timestamp_column: String,
    /// Drop data lines without a full `YYYY-MM-DDTHH:MM:SS` timestamp.
    pub validate_timestamps: bool,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            comment_marker: "#".to_string(),
            logger_id_marker: "Logger-id".to_string(),
            timestamp_column: "Date_time".to_string(),
            validate_timestamps: true,
        }
    }
}

/// Single-pass classifier producing an [`ExclusionSet`].
#[derive(Debug, Clone)]
pub struct LineSanitizer {
    config: SanitizerConfig,
    timestamps: TimestampMatcher,
}

impl LineSanitizer {
    pub fn new(config: SanitizerConfig) -> Self {
        Self {
            config,
            timestamps: TimestampMatcher::new(),
        }
    }

    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Compute the set of line indices to skip.
    ///
    /// Pure function of `lines` and the configuration: running it twice on
    /// the same input gives the same set.
    pub fn exclusions<S: AsRef<str>>(&self, lines: &[S]) -> ExclusionSet {
        let mut excluded = ExclusionSet::new();
        let Some(first) = lines.first() else {
            return excluded;
        };

        let check_timestamps = self.config.validate_timestamps
            && first.as_ref().contains(self.config.timestamp_column.as_str());

        let mut in_top_header = true;
        for (index, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            if line.starts_with(self.config.comment_marker.as_str()) {
                excluded.insert(index);
            } else if line.contains(self.config.logger_id_marker.as_str()) {
                if in_top_header {
                    // Keep only the last header of the top block.
                    if index > 0 {
                        excluded.insert(index - 1);
                    }
                } else {
                    excluded.insert(index);
                }
            } else {
                in_top_header = false;
                // Line 0 names the timestamp column; it is the column header.
                if check_timestamps && index > 0 && !self.timestamps.contains_timestamp(line) {
                    excluded.insert(index);
                }
            }
        }

        excluded
    }
}

impl Default for LineSanitizer {
    fn default() -> Self {
        Self::new(SanitizerConfig::default())
    }
}
