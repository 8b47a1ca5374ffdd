//! One run: load → summarize → write outputs.
//!
//! Everything the run may produce is controlled by the [`ReportConfig`]
//! handed in; the returned [`RunReport`] carries the table and figures so the
//! caller can open the viewer or decide how to treat partial failures.

use std::path::{Path, PathBuf};

use crate::config::ReportConfig;
use crate::data::filter::present_sensors;
use crate::data::loader::load_file;
use crate::data::model::LoggerTable;
use crate::data::sanitize::LineSanitizer;
use crate::data::stats::{compute_sensor_stats, RunSpan, StatisticsSummary};
use crate::data::time::TimestampMatcher;
use crate::error::{PlotError, ReportError, StatsError};
use crate::figure::{self, DistributionFigure, TimelineFigure};
use crate::report::{html, raster, statistics, table, OutputNames};

/// Figures built for a run.
#[derive(Debug)]
pub struct Figures {
    pub timeline: TimelineFigure,
    pub battery: Option<TimelineFigure>,
    /// Kept as a result: a failed distribution does not stop the timeline.
    pub distribution: Result<DistributionFigure, PlotError>,
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub table: LoggerTable,
    pub title: String,
    /// Recognized sensors present in the table.
    pub sensors: Vec<String>,
    pub summary: StatisticsSummary,
    /// Sensors left out of the summary and why.
    pub stats_failures: Vec<(String, StatsError)>,
    pub figures: Option<Figures>,
    /// Files written, in order.
    pub written: Vec<PathBuf>,
}

impl RunReport {
    /// The distribution failure, if figures were built and it failed.
    pub fn distribution_error(&self) -> Option<&PlotError> {
        self.figures.as_ref()?.distribution.as_ref().err()
    }
}

/// Process one logger file according to `config`.
///
/// Fails without writing anything when the table cannot be loaded (missing
/// timestamp column, no rows). A locked output file aborts the run at that
/// file.
pub fn run(input: &Path, config: &ReportConfig) -> Result<RunReport, ReportError> {
    let content = &config.content;

    log::info!("loading...");
    let sanitizer = LineSanitizer::new(config.sanitizer_config());
    let table = load_file(input, &sanitizer)?;

    let matcher = TimestampMatcher::new();
    let span = RunSpan::from_table(&table, &content.timestamp_column, &matcher)?;
    let title = figure::title(&table, content);
    let sensors = present_sensors(&table, &content.sensors);

    let outcomes = compute_sensor_stats(&table, &sensors, config.equilibration_skip);
    let (summary, stats_failures) = StatisticsSummary::collect(&span, outcomes, config.equilibration_skip);
    for (sensor, e) in &stats_failures {
        log::warn!("...statistics for sensor {sensor} failed: {e}");
    }

    let names = OutputNames::new(input, &span.last_raw, config.output_dir.as_deref());
    let writes_files = config.save_statistics
        || config.save_statistics_json
        || config.export_spreadsheets
        || config.save_html
        || config.write_png;
    if writes_files {
        names.ensure_dir()?;
    }

    let mut written = Vec::new();

    if config.save_statistics {
        log::info!("Writing statistics file...");
        let path = names.statistics();
        if statistics::write_statistics(&path, &summary, content.statistics_separator)? {
            written.push(path);
        }
    }

    if config.save_statistics_json {
        let path = names.statistics_json();
        statistics::write_statistics_json(&path, &summary)?;
        written.push(path);
    }

    if config.export_spreadsheets {
        log::info!("Writing table copies...");
        let csv_path = names.table_csv();
        table::write_table_csv(&csv_path, &table)?;
        written.push(csv_path);

        let xlsx_path = names.table_xlsx();
        table::write_table_xlsx(&xlsx_path, &table)?;
        written.push(xlsx_path);

        let parquet_path = names.table_parquet();
        table::write_table_parquet(&parquet_path, &table)?;
        written.push(parquet_path);
    }

    let figures = if config.wants_figures() {
        let battery = figure::battery(&table, content, &title, span.first, &matcher);
        if battery.is_some() {
            log::info!("plotting {}...", content.battery_voltage_column);
        }

        log::info!("plotting distribution...");
        let distribution = figure::distribution(&table, &sensors, &title);
        if let Err(e) = &distribution {
            log::error!("Distribution plot failed: {e}");
        }

        log::info!("plotting timeline...");
        let timeline = figure::timeline(&table, content, &sensors, &title, span.first, &matcher);
        if timeline.is_empty() {
            log::warn!("...no sensor values to plot");
        }

        if config.save_html {
            log::info!("Writing html...");
            let path = names.interactive_html();
            html::write_timeline_html(&path, &timeline)?;
            written.push(path);
        }

        if config.write_png && !timeline.is_empty() {
            log::info!("Writing png...");
            let path = names.timeline_png();
            raster::write_timeline_png(&path, &timeline)?;
            written.push(path);
        }

        Some(Figures {
            timeline,
            battery,
            distribution,
        })
    } else {
        None
    };

    Ok(RunReport {
        table,
        title,
        sensors,
        summary,
        stats_failures,
        figures,
        written,
    })
}
