//! Figure models shared by the viewer, the HTML document and the PNG.
//!
//! Time axes are stored as seconds since the first timestamp of the run;
//! [`TimelineFigure::start`] turns them back into wall-clock time for labels.

use chrono::{Duration, NaiveDateTime};
use eframe::egui::Color32;

use crate::color::ColorMap;
use crate::config::ContentDefinitions;
use crate::data::model::{CellValue, LoggerTable};
use crate::data::stats::quantile;
use crate::data::time::TimestampMatcher;
use crate::error::PlotError;

pub const BATTERY_TITLE_SUFFIX: &str = ": Battery Voltage [mV]    (full: 4200, empty: 3600)";

/// One named line over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Color32,
    /// `[seconds since start, value]`
    pub points: Vec<[f64; 2]>,
}

/// Values over time, one series per column.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineFigure {
    pub title: String,
    pub start: NaiveDateTime,
    pub series: Vec<Series>,
}

impl TimelineFigure {
    /// Axis label for an x coordinate, e.g. `01 Jan 2023, 00:05`.
    pub fn label_at(&self, seconds: f64) -> String {
        time_label(self.start, seconds)
    }

    /// Bounds of all points as `(x_min, x_max, y_min, y_max)`.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.series.iter().flat_map(|s| s.points.iter());
        let first = points.next()?;
        let init = (first[0], first[0], first[1], first[1]);
        Some(points.fold(init, |(x0, x1, y0, y1), p| {
            (x0.min(p[0]), x1.max(p[0]), y0.min(p[1]), y1.max(p[1]))
        }))
    }

    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

/// Wall-clock label of `seconds` after `start`.
pub fn time_label(start: NaiveDateTime, seconds: f64) -> String {
    let at = start + Duration::milliseconds((seconds * 1000.0).round() as i64);
    at.format("%d %b %Y, %H:%M").to_string()
}

/// Box-and-whisker summary of one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionBox {
    pub name: String,
    pub color: Color32,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub mean: f64,
}

/// Side-by-side distributions of the present sensors.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionFigure {
    pub title: String,
    pub boxes: Vec<DistributionBox>,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Logger id of the second data row (first if there is only one), else the
/// default title.
pub fn title(table: &LoggerTable, content: &ContentDefinitions) -> String {
    [1, 0]
        .iter()
        .filter_map(|&row| table.cell(&content.logger_id_column, row))
        .find(|c| !c.is_null())
        .map(|c| c.to_string())
        .unwrap_or_else(|| content.default_title.clone())
}

/// Seconds since `start` for every row; `None` where the timestamp is unusable.
fn row_offsets(
    table: &LoggerTable,
    timestamp_column: &str,
    start: NaiveDateTime,
    matcher: &TimestampMatcher,
) -> Vec<Option<f64>> {
    let Some(column) = table.column(timestamp_column) else {
        return vec![None; table.len()];
    };
    column
        .cells
        .iter()
        .map(|cell| match cell {
            CellValue::Text(t) => matcher
                .parse(t)
                .map(|ts| (ts - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        })
        .collect()
}

fn series_for(name: &str, table: &LoggerTable, offsets: &[Option<f64>], colors: &ColorMap) -> Series {
    let points = table
        .column(name)
        .map(|column| {
            column
                .cells
                .iter()
                .zip(offsets)
                .filter_map(|(cell, x)| Some([(*x)?, cell.as_f64()?]))
                .filter(|p| p[1].is_finite())
                .collect()
        })
        .unwrap_or_default();

    Series {
        name: name.to_string(),
        color: colors.color_for(name),
        points,
    }
}

/// Temperature timeline of the present sensors.
pub fn timeline(
    table: &LoggerTable,
    content: &ContentDefinitions,
    sensors: &[String],
    title: &str,
    start: NaiveDateTime,
    matcher: &TimestampMatcher,
) -> TimelineFigure {
    let colors = ColorMap::new(sensors);
    let offsets = row_offsets(table, &content.timestamp_column, start, matcher);
    TimelineFigure {
        title: title.to_string(),
        start,
        series: sensors
            .iter()
            .map(|s| series_for(s, table, &offsets, &colors))
            .collect(),
    }
}

/// Battery voltage over time, when the logger records it.
pub fn battery(
    table: &LoggerTable,
    content: &ContentDefinitions,
    title: &str,
    start: NaiveDateTime,
    matcher: &TimestampMatcher,
) -> Option<TimelineFigure> {
    let name = &content.battery_voltage_column;
    if !table.has_column(name) {
        return None;
    }
    let colors = ColorMap::new(std::slice::from_ref(name));
    let offsets = row_offsets(table, &content.timestamp_column, start, matcher);
    Some(TimelineFigure {
        title: format!("{title}{BATTERY_TITLE_SUFFIX}"),
        start,
        series: vec![series_for(name, table, &offsets, &colors)],
    })
}

/// Distribution panels, one per present sensor, over all rows.
pub fn distribution(
    table: &LoggerTable,
    sensors: &[String],
    title: &str,
) -> Result<DistributionFigure, PlotError> {
    if sensors.is_empty() {
        return Err(PlotError::NoSensors);
    }
    let colors = ColorMap::new(sensors);

    let mut boxes = Vec::with_capacity(sensors.len());
    for name in sensors {
        let column = table
            .column(name)
            .ok_or_else(|| PlotError::NonNumeric(name.clone()))?;
        if !column.is_numeric() {
            return Err(PlotError::NonNumeric(name.clone()));
        }
        let mut values: Vec<f64> = column
            .cells
            .iter()
            .filter_map(CellValue::as_f64)
            .filter(|v| v.is_finite())
            .collect();
        if values.is_empty() {
            continue;
        }
        values.sort_by(f64::total_cmp);

        boxes.push(DistributionBox {
            name: name.clone(),
            color: colors.color_for(name),
            lower_whisker: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            upper_whisker: values[values.len() - 1],
            mean: values.iter().sum::<f64>() / values.len() as f64,
        });
    }

    Ok(DistributionFigure {
        title: title.to_string(),
        boxes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LoggerTable {
        let rows = [
            ("L7", "2023-01-01T00:00:00", "20.0", "4100"),
            ("L7", "2023-01-01T00:01:00", "21.0", "4090"),
            ("L7", "2023-01-01T00:0", "99.0", "4080"),
            ("L7", "2023-01-01T00:03:00", "23.0", ""),
        ];
        LoggerTable::from_rows(
            ["Logger-id", "Date_time", "TMP1", "Vbatt"].map(String::from).to_vec(),
            rows.iter()
                .map(|(a, b, c, d)| [a, b, c, d].map(|s| CellValue::parse(s)).to_vec())
                .collect(),
        )
    }

    fn start() -> NaiveDateTime {
        TimestampMatcher::new().parse("2023-01-01T00:00:00").unwrap()
    }

    #[test]
    fn title_comes_from_the_logger_id() {
        let content = ContentDefinitions::default();
        assert_eq!(title(&sample(), &content), "L7");
        let bare = LoggerTable::from_rows(vec!["Date_time".into()], vec![]);
        assert_eq!(title(&bare, &content), "TSV log data");
    }

    #[test]
    fn timeline_skips_rows_without_usable_time() {
        let content = ContentDefinitions::default();
        let fig = timeline(&sample(), &content, &["TMP1".into()], "L7", start(), &TimestampMatcher::new());
        assert_eq!(fig.series[0].points, vec![[0.0, 20.0], [60.0, 21.0], [180.0, 23.0]]);
        assert_eq!(fig.bounds(), Some((0.0, 180.0, 20.0, 23.0)));
        assert_eq!(fig.label_at(180.0), "01 Jan 2023, 00:03");
    }

    #[test]
    fn battery_figure_only_with_voltage_column() {
        let content = ContentDefinitions::default();
        let m = TimestampMatcher::new();
        let fig = battery(&sample(), &content, "L7", start(), &m).unwrap();
        assert!(fig.title.starts_with("L7: Battery Voltage [mV]"));
        assert_eq!(fig.series[0].points.len(), 2);

        let no_vbatt = LoggerTable::from_rows(vec!["Date_time".into()], vec![]);
        assert!(battery(&no_vbatt, &content, "x", start(), &m).is_none());
    }

    #[test]
    fn distribution_needs_sensors() {
        assert!(matches!(
            distribution(&sample(), &[], "L7"),
            Err(PlotError::NoSensors)
        ));
        let fig = distribution(&sample(), &["TMP1".into()], "L7").unwrap();
        let b = &fig.boxes[0];
        assert_eq!((b.lower_whisker, b.upper_whisker), (20.0, 99.0));
        assert_eq!(b.median, 22.0);
    }

    #[test]
    fn text_sensor_breaks_the_distribution() {
        assert!(matches!(
            distribution(&sample(), &["Logger-id".into()], "L7"),
            Err(PlotError::NonNumeric(_))
        ));
    }
}
