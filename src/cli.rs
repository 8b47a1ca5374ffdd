use std::path::PathBuf;

use clap::Parser;

pub const PICKER_TITLE: &str = "Select temperature logger .tsv file. Use -h for help in console mode.";

/// Plot time series data with ISO date format.
///
/// Lines with wrongly formatted ISO dates are optionally removed before
/// parsing, as are repeated headers from logger restarts. Which outputs are
/// produced (statistics, interactive HTML, PNG, table copies, viewer window)
/// is set in `logger-report.json` in the working directory.
#[derive(Parser, Debug)]
#[command(name = "logger-report", version)]
pub struct Cli {
    /// Logger file (.tsv / .csv). Without exactly one file a file picker opens.
    pub files: Vec<PathBuf>,
}

/// Where the input file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Path(PathBuf),
    /// Ask interactively.
    Picker,
}

impl InputSource {
    /// Exactly one path is used as is; any other count asks.
    pub fn from_args(mut files: Vec<PathBuf>) -> Self {
        if files.len() == 1 {
            InputSource::Path(files.remove(0))
        } else {
            InputSource::Picker
        }
    }

    /// Resolve to a path; `None` when the picker was cancelled.
    pub fn resolve(self) -> Option<PathBuf> {
        match self {
            InputSource::Path(path) => Some(path),
            InputSource::Picker => pick_file(),
        }
    }
}

fn pick_file() -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title(PICKER_TITLE)
        .add_filter("tsv files", &["tsv"])
        .add_filter("csv files", &["csv"])
        .add_filter("all files", &["*"]);
    if let Ok(cwd) = std::env::current_dir() {
        dialog = dialog.set_directory(cwd);
    }
    dialog.pick_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_argument_is_the_input() {
        let cli = Cli::try_parse_from(["logger-report", "log.tsv"]).unwrap();
        assert_eq!(
            InputSource::from_args(cli.files),
            InputSource::Path(PathBuf::from("log.tsv"))
        );
    }

    #[test]
    fn other_argument_counts_fall_back_to_picker() {
        let none = Cli::try_parse_from(["logger-report"]).unwrap();
        assert_eq!(InputSource::from_args(none.files), InputSource::Picker);

        let two = Cli::try_parse_from(["logger-report", "a.tsv", "b.tsv"]).unwrap();
        assert_eq!(InputSource::from_args(two.files), InputSource::Picker);
    }

    #[test]
    fn help_flag_prints_usage() {
        for flag in ["-h", "--help"] {
            let err = Cli::try_parse_from(["logger-report", flag]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        }
    }
}
