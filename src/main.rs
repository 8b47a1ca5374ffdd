use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use logger_report::cli::{Cli, InputSource};
use logger_report::config::ReportConfig;
use logger_report::state::ViewerState;
use logger_report::{app, pipeline};

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("initializing...");

    let cli = Cli::parse();
    let Some(input) = InputSource::from_args(cli.files).resolve() else {
        log::info!("No file selected.");
        return Ok(ExitCode::SUCCESS);
    };

    let cwd = std::env::current_dir().context("reading working directory")?;
    let config = ReportConfig::discover(&cwd)?;

    let report = match pipeline::run(&input, &config) {
        Ok(report) => report,
        Err(e) => {
            if e.is_locked_output() {
                log::error!("Output file is locked.");
            }
            log::error!("{e}");
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    for path in &report.written {
        log::info!("wrote {}", path.display());
    }
    let distribution_failed = report.distribution_error().is_some();

    if config.show_interactive {
        if let Some(state) = ViewerState::from_report(report) {
            app::show(state).map_err(|e| anyhow::anyhow!("viewer window failed: {e}"))?;
        }
    }

    if distribution_failed {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
