use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::data::stats::format_stat;
use crate::figure::{time_label, DistributionFigure, TimelineFigure};
use crate::state::{ViewTab, ViewerState};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the figure selected in the top bar.
pub fn central_view(ui: &mut Ui, state: &ViewerState) {
    match state.tab {
        ViewTab::Timeline if state.timeline.is_empty() => {
            placeholder(ui, "No sensor values to plot.")
        }
        ViewTab::Timeline => timeline_plot(ui, "timeline_plot", &state.timeline, state, "Temperature [°C]"),
        ViewTab::Battery => match &state.battery {
            Some(fig) => timeline_plot(ui, "battery_plot", fig, state, "Voltage [mV]"),
            None => placeholder(ui, "No battery voltage column in this log."),
        },
        ViewTab::Distribution => match &state.distribution {
            Ok(fig) => distribution_plot(ui, fig, state),
            Err(e) => placeholder(ui, &format!("Distribution plot failed: {e}")),
        },
        ViewTab::Statistics => crate::ui::panels::statistics_table(ui, state),
    }
}

fn placeholder(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(text);
    });
}

/// Lines over wall-clock time.
///
/// Sensor series follow the side panel selection; other series (battery
/// voltage) are always drawn.
fn timeline_plot(ui: &mut Ui, id: &str, figure: &TimelineFigure, state: &ViewerState, y_label: &str) {
    ui.label(RichText::new(&figure.title).strong());

    let start = figure.start;
    let sensor_names: Vec<&str> = state.timeline.series.iter().map(|s| s.name.as_str()).collect();

    Plot::new(id)
        .legend(Legend::default())
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| time_label(start, mark.value))
        .label_formatter(move |name, value| {
            let when = time_label(start, value.x);
            if name.is_empty() {
                when
            } else {
                format!("{name}\n{when}  {:.2}", value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &figure.series {
                let is_sensor = sensor_names.contains(&series.name.as_str());
                if is_sensor && !state.is_visible(&series.name) {
                    continue;
                }
                let points: PlotPoints = series.points.iter().copied().collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&series.name)
                        .color(series.color)
                        .width(1.5),
                );
            }
        });
}

/// One box per visible sensor, with whiskers at the extremes and the mean
/// marked.
fn distribution_plot(ui: &mut Ui, figure: &DistributionFigure, state: &ViewerState) {
    ui.label(RichText::new(&figure.title).strong());

    let names: Vec<String> = figure.boxes.iter().map(|b| b.name.clone()).collect();

    Plot::new("distribution_plot")
        .legend(Legend::default())
        .y_axis_label("Temperature [°C]")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < f64::EPSILON && idx >= 0.0 {
                names.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (i, b) in figure.boxes.iter().enumerate() {
                if !state.is_visible(&b.name) {
                    continue;
                }
                let x = i as f64;
                let elem = BoxElem::new(
                    x,
                    BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                )
                .name(&b.name)
                .box_width(0.5)
                .whisker_width(0.3)
                .fill(b.color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, b.color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&b.name).color(b.color));

                plot_ui.points(
                    Points::new(vec![[x, b.mean]])
                        .name(format!("{} mean {}", b.name, format_stat(b.mean)))
                        .shape(MarkerShape::Diamond)
                        .radius(5.0)
                        .color(Color32::BLACK),
                );
            }
        });
}
