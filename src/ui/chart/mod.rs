use std::path::PathBuf;

use egui::{Vec2b, Visuals};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::chart::{AttendanceChart, CHART_TITLE, DATASET_LABEL, X_AXIS_LABEL};

use super::ACCENT_BLUE;

/// `AttendanceChartApp` renders the attendance trend chart for a series
/// loaded at startup. Static once drawn: one load, one configuration, no
/// refresh. Missing or invalid data means the window simply shows no
/// chart (the failure was already logged by the loader).
pub struct AttendanceChartApp {
    chart: Option<AttendanceChart>,
}

impl AttendanceChartApp {
    pub fn from_file(input: &PathBuf, cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(Visuals::dark());

        Self {
            chart: AttendanceChart::from_file(input),
        }
    }
}

impl eframe::App for AttendanceChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(chart) = &self.chart else {
                return;
            };

            ui.heading(CHART_TITLE);
            ui.separator();

            let dates: Vec<String> = chart.dates_for_axis();
            let tooltip_dates = dates.clone();

            let plot = Plot::new("attendance")
                .legend(Legend::default())
                .include_y(0.)
                .include_y(1.)
                .include_x(-0.5)
                .include_x(chart.point_count() as f64 - 0.5)
                .auto_bounds(Vec2b::new(false, false))
                .allow_drag(false)
                .allow_scroll(false)
                .allow_zoom(false)
                .x_axis_label(X_AXIS_LABEL)
                .x_axis_formatter(move |mark, _range| {
                    let index = mark.value;
                    if index < 0. || index.fract() != 0. {
                        return String::new();
                    }
                    dates
                        .get(index as usize)
                        .cloned()
                        .unwrap_or_default()
                })
                .y_axis_formatter(|mark, _range| {
                    AttendanceChart::y_tick_label(mark.value)
                        .unwrap_or("")
                        .to_string()
                })
                .label_formatter(move |_name, point| {
                    let date = if point.x >= 0. {
                        tooltip_dates
                            .get(point.x.round() as usize)
                            .cloned()
                            .unwrap_or_default()
                    } else {
                        String::new()
                    };
                    format!("{}\n{}", date, AttendanceChart::presence_label(point.y))
                });

            let line_points = PlotPoints::new(chart.points());
            let marker_points = PlotPoints::new(chart.points());

            plot.show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(DATASET_LABEL, line_points)
                        .color(ACCENT_BLUE)
                        .width(3.)
                        .fill(0.),
                );
                plot_ui.points(
                    Points::new(DATASET_LABEL, marker_points)
                        .color(ACCENT_BLUE)
                        .radius(5.),
                );
            });
        });
    }
}
