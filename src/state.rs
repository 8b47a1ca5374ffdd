use std::path::PathBuf;

use crate::data::filter::{init_selection, SensorSelection};
use crate::data::stats::StatisticsSummary;
use crate::figure::{DistributionFigure, TimelineFigure};
use crate::pipeline::RunReport;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// Which figure fills the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTab {
    Timeline,
    Battery,
    Distribution,
    Statistics,
}

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    pub title: String,
    pub timeline: TimelineFigure,
    pub battery: Option<TimelineFigure>,
    /// The error text when the distribution could not be built.
    pub distribution: Result<DistributionFigure, String>,
    pub summary: StatisticsSummary,
    /// Sensors missing from the summary, with the reason.
    pub stats_failures: Vec<(String, String)>,
    /// Sensors drawn in the timeline and distribution.
    pub visible: SensorSelection,
    pub tab: ViewTab,
    /// Output files of the run.
    pub written: Vec<PathBuf>,
    pub rows: usize,
}

impl ViewerState {
    /// Take over a finished run; `None` when no figures were built.
    pub fn from_report(report: RunReport) -> Option<Self> {
        let figures = report.figures?;
        Some(Self {
            title: report.title,
            timeline: figures.timeline,
            battery: figures.battery,
            distribution: figures.distribution.map_err(|e| e.to_string()),
            summary: report.summary,
            stats_failures: report
                .stats_failures
                .into_iter()
                .map(|(sensor, e)| (sensor, e.to_string()))
                .collect(),
            visible: init_selection(&report.sensors),
            tab: ViewTab::Timeline,
            written: report.written,
            rows: report.table.len(),
        })
    }

    pub fn is_visible(&self, sensor: &str) -> bool {
        self.visible.contains(sensor)
    }

    /// Toggle a single sensor's visibility.
    pub fn toggle_sensor(&mut self, sensor: &str) {
        if !self.visible.remove(sensor) {
            self.visible.insert(sensor.to_string());
        }
    }

    /// Show every sensor of the timeline.
    pub fn select_all(&mut self) {
        self.visible = self.timeline.series.iter().map(|s| s.name.clone()).collect();
    }

    /// Hide every sensor.
    pub fn select_none(&mut self) {
        self.visible.clear();
    }
}
