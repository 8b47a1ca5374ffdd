//! Output files of a run.
//!
//! Every file name starts with the last logged timestamp (colons replaced by
//! underscores) so repeated downloads from the same logger never overwrite
//! each other:
//!
//! ```text
//!  2023-01-01T00_01_00_statistics_log.tsv
//!  2023-01-01T00_01_00_table_log.csv
//!  2023-01-01T00_01_00_table_log.xlsx
//!  2023-01-01T00_01_00_table_log.parquet
//!  2023-01-01T00_01_00_interactive_plot_log.html
//!  2023-01-01T00_01_00_log.png
//! ```

pub mod html;
pub mod raster;
pub mod statistics;
pub mod table;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::data::time::file_safe_timestamp;
use crate::error::ExportError;

/// Deterministic output paths for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    dir: PathBuf,
    prefix: String,
    stem: String,
    /// Statistics file extension including the dot, or empty.
    ext: String,
}

impl OutputNames {
    /// `output_dir` defaults to the directory holding `input`.
    pub fn new(input: &Path, last_timestamp: &str, output_dir: Option<&Path>) -> Self {
        let dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = match input.extension().map(|e| e.to_string_lossy()) {
            // Statistics are delimited text; a reloaded table export gets `.tsv`.
            Some(e) if e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq") => {
                ".tsv".to_string()
            }
            Some(e) => format!(".{e}"),
            None => String::new(),
        };

        Self {
            dir,
            prefix: file_safe_timestamp(last_timestamp),
            stem,
            ext,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn named(&self, role: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{}_{}{}{}", self.prefix, role, self.stem, ext))
    }

    pub fn statistics(&self) -> PathBuf {
        self.named("statistics_", &self.ext)
    }

    pub fn statistics_json(&self) -> PathBuf {
        self.named("statistics_", ".json")
    }

    pub fn table_csv(&self) -> PathBuf {
        self.named("table_", ".csv")
    }

    pub fn table_xlsx(&self) -> PathBuf {
        self.named("table_", ".xlsx")
    }

    pub fn table_parquet(&self) -> PathBuf {
        self.named("table_", ".parquet")
    }

    pub fn interactive_html(&self) -> PathBuf {
        self.named("interactive_plot_", ".html")
    }

    pub fn timeline_png(&self) -> PathBuf {
        self.named("", ".png")
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), ExportError> {
        if self.dir.as_os_str().is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| ExportError::from_io(&self.dir, e))
    }
}

/// Open `path` for writing, reporting a locked target as such.
pub fn create_file(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ExportError::from_io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_carry_timestamp_prefix() {
        let names = OutputNames::new(Path::new("/data/run/log.tsv"), "2023-01-01T00:01:00", None);
        assert_eq!(
            names.statistics(),
            PathBuf::from("/data/run/2023-01-01T00_01_00_statistics_log.tsv")
        );
        assert_eq!(
            names.interactive_html(),
            PathBuf::from("/data/run/2023-01-01T00_01_00_interactive_plot_log.html")
        );
        assert_eq!(
            names.timeline_png(),
            PathBuf::from("/data/run/2023-01-01T00_01_00_log.png")
        );
        assert_eq!(
            names.table_parquet(),
            PathBuf::from("/data/run/2023-01-01T00_01_00_table_log.parquet")
        );
    }

    #[test]
    fn reloaded_parquet_exports_get_delimited_statistics() {
        let names = OutputNames::new(
            Path::new("/d/x_table_log.parquet"),
            "2023-01-01T00:00:00",
            None,
        );
        assert_eq!(
            names.statistics(),
            PathBuf::from("/d/2023-01-01T00_00_00_statistics_x_table_log.tsv")
        );
        let pq = OutputNames::new(Path::new("/d/x.PQ"), "2023-01-01T00:00:00", None);
        assert_eq!(
            pq.statistics(),
            PathBuf::from("/d/2023-01-01T00_00_00_statistics_x.tsv")
        );

        let csv = OutputNames::new(Path::new("/d/log.csv"), "2023-01-01T00:00:00", None);
        assert_eq!(
            csv.statistics(),
            PathBuf::from("/d/2023-01-01T00_00_00_statistics_log.csv")
        );
        assert_eq!(
            csv.table_xlsx(),
            PathBuf::from("/d/2023-01-01T00_00_00_table_log.xlsx")
        );
    }

    #[test]
    fn output_dir_overrides_input_dir() {
        let names = OutputNames::new(
            Path::new("log"),
            "2023-01-01T00:01:00",
            Some(Path::new("/out")),
        );
        assert_eq!(
            names.statistics(),
            PathBuf::from("/out/2023-01-01T00_01_00_statistics_log")
        );
    }

    #[test]
    fn missing_dirs_are_created() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("a").join("b");
        let names = OutputNames::new(Path::new("log.tsv"), "2023-01-01T00:00:00", Some(&out));
        names.ensure_dir().unwrap();
        assert!(out.is_dir());
    }
}
