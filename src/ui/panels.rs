use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::stats::format_stat;
use crate::state::{ViewTab, ViewerState};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Figure tabs plus a short summary of the run.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading(&state.title);
        ui.separator();

        ui.selectable_value(&mut state.tab, ViewTab::Timeline, "Temperature");
        if state.battery.is_some() {
            ui.selectable_value(&mut state.tab, ViewTab::Battery, "Battery");
        }
        ui.selectable_value(&mut state.tab, ViewTab::Distribution, "Distribution");
        ui.selectable_value(&mut state.tab, ViewTab::Statistics, "Statistics");

        ui.separator();
        ui.label(format!(
            "{} rows | duration {} | {} file(s) written",
            state.rows,
            state.summary.duration,
            state.written.len()
        ));
    });
}

// ---------------------------------------------------------------------------
// Left side panel
// ---------------------------------------------------------------------------

/// Sensor visibility, statistics problems and the written files.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Sensors");
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("All").clicked() {
            state.select_all();
        }
        if ui.button("None").clicked() {
            state.select_none();
        }
    });

    let sensors: Vec<(String, Color32)> = state
        .timeline
        .series
        .iter()
        .map(|s| (s.name.clone(), s.color))
        .collect();

    egui::ScrollArea::vertical()
        .id_salt("sensor_list")
        .max_height(ui.available_height() * 0.5)
        .show(ui, |ui: &mut Ui| {
            for (name, color) in &sensors {
                let mut checked = state.is_visible(name);
                let label = RichText::new(name.as_str()).color(*color);
                if ui.checkbox(&mut checked, label).changed() {
                    state.toggle_sensor(name);
                }
            }
        });

    if !state.stats_failures.is_empty() {
        ui.separator();
        ui.label(RichText::new("Statistics skipped").strong());
        for (sensor, reason) in &state.stats_failures {
            ui.colored_label(Color32::from_rgb(200, 80, 40), format!("{sensor}: {reason}"));
        }
    }

    if !state.written.is_empty() {
        ui.separator();
        ui.label(RichText::new("Written").strong());
        egui::ScrollArea::vertical()
            .id_salt("written_files")
            .show(ui, |ui: &mut Ui| {
                for path in &state.written {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    ui.label(name).on_hover_text(path.display().to_string());
                }
            });
    }
}

// ---------------------------------------------------------------------------
// Statistics tab
// ---------------------------------------------------------------------------

/// The summary as a table, formatted like the statistics file.
pub fn statistics_table(ui: &mut Ui, state: &ViewerState) {
    let summary = &state.summary;
    ui.label(format!("Duration: {}", summary.duration));
    if summary.equilibration_skip > 0 {
        ui.label(format!(
            "First {} rows skipped for equilibration",
            summary.equilibration_skip
        ));
    }
    ui.separator();

    if summary.is_empty() {
        ui.label("No sensor statistics available.");
        return;
    }

    egui::Grid::new("statistics_grid")
        .striped(true)
        .num_columns(6)
        .show(ui, |ui: &mut Ui| {
            for header in ["Sensor", "Mean", "Min", "Max", "Stdev", "Count"] {
                ui.label(RichText::new(header).strong());
            }
            ui.end_row();

            for s in &summary.sensors {
                let color = state
                    .timeline
                    .series
                    .iter()
                    .find(|series| series.name == s.sensor)
                    .map(|series| series.color)
                    .unwrap_or(Color32::GRAY);
                ui.label(RichText::new(&s.sensor).color(color));
                ui.label(format_stat(s.mean));
                ui.label(format_stat(s.min));
                ui.label(format_stat(s.max));
                ui.label(format_stat(s.stdev));
                ui.label(s.count.to_string());
                ui.end_row();
            }
        });
}
