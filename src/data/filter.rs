use std::collections::BTreeSet;
use std::ops::Range;

use super::model::LoggerTable;

/// Sensors currently drawn by the viewer.
/// A sensor absent from the set is hidden.
pub type SensorSelection = BTreeSet<String>;

/// Allow-listed sensors that actually exist in `table`, in allow-list order.
pub fn present_sensors(table: &LoggerTable, allow_list: &[String]) -> Vec<String> {
    allow_list
        .iter()
        .filter(|s| table.has_column(s))
        .cloned()
        .collect()
}

/// Initialise a [`SensorSelection`] with every present sensor visible.
pub fn init_selection(sensors: &[String]) -> SensorSelection {
    sensors.iter().cloned().collect()
}

/// Rows that count for statistics once `skip` leading rows are left out
/// for sensor equilibration.
pub fn evaluated_rows(n_rows: usize, skip: usize) -> Range<usize> {
    skip.min(n_rows)..n_rows
}
