//! Fixed-resolution PNG of the timeline.
//!
//! Drawn with the [`plotters`] bitmap backend into an in-memory RGB buffer,
//! then encoded by the `image` crate so a locked target file is reported
//! the same way as every other output.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

use image::{ImageFormat, RgbImage};
use plotters::prelude::*;

use super::create_file;
use crate::color::PLOT_BACKGROUND;
use crate::error::{ExportError, PlotError};
use crate::figure::TimelineFigure;

pub const PNG_WIDTH: u32 = 2880;
pub const PNG_HEIGHT: u32 = 1620;
/// Tick, legend and title font size in pixels.
pub const FONT_SIZE: i32 = 33;

fn drawing_error<E: Display>(e: E) -> PlotError {
    PlotError::Drawing(e.to_string())
}

fn rgb(color: eframe::egui::Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

/// Render the timeline into an RGB image.
pub fn render_timeline(figure: &TimelineFigure) -> Result<RgbImage, PlotError> {
    let (x0, mut x1, mut y0, mut y1) = figure
        .bounds()
        .ok_or_else(|| PlotError::Drawing("timeline has no data points".to_string()))?;
    if x1 <= x0 {
        x1 = x0 + 1.0;
    }
    let margin = ((y1 - y0) * 0.05).max(0.5);
    y0 -= margin;
    y1 += margin;

    let mut buffer = vec![0u8; (PNG_WIDTH * PNG_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (PNG_WIDTH, PNG_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        let font = ("sans-serif", FONT_SIZE);
        let mut chart = ChartBuilder::on(&root)
            .caption(&figure.title, font)
            .margin(40)
            .x_label_area_size(90)
            .y_label_area_size(140)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(drawing_error)?;

        chart
            .plotting_area()
            .fill(&rgb(PLOT_BACKGROUND))
            .map_err(drawing_error)?;

        let label_at = |x: &f64| figure.label_at(*x);
        chart
            .configure_mesh()
            .bold_line_style(WHITE)
            .light_line_style(WHITE.mix(0.5))
            .x_labels(6)
            .y_labels(10)
            .x_label_formatter(&label_at)
            .label_style(font)
            .draw()
            .map_err(drawing_error)?;

        for series in &figure.series {
            let color = rgb(series.color);
            chart
                .draw_series(LineSeries::new(
                    series.points.iter().map(|p| (p[0], p[1])),
                    color.stroke_width(3),
                ))
                .map_err(drawing_error)?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], color.stroke_width(3)));
        }

        chart
            .configure_series_labels()
            .label_font(font)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(drawing_error)?;

        root.present().map_err(drawing_error)?;
    }

    RgbImage::from_raw(PNG_WIDTH, PNG_HEIGHT, buffer)
        .ok_or_else(|| PlotError::Drawing("image buffer has the wrong size".to_string()))
}

/// Render and write the timeline PNG.
pub fn write_timeline_png(path: &Path, figure: &TimelineFigure) -> Result<(), ExportError> {
    let image = render_timeline(figure)?;
    let mut out = create_file(path)?;
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(PlotError::from)?;
    out.flush().map_err(|e| ExportError::from_io(path, e))
}
