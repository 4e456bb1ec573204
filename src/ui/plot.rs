use eframe::egui::{Color32, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};
use rusty_pivot::color::parse_hex;
use rusty_pivot::data::pivot::Point;
use rusty_pivot::{ChartData, ChartSeries, Period};

use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Chart (central panel)
// ---------------------------------------------------------------------------

/// Render the chart for the current query in the central panel.
pub fn chart(ui: &mut Ui, state: &AppState) {
    let chart = match &state.chart {
        Some(chart) => chart,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a catalog to view indicators  (File → Open catalog…)");
            });
            return;
        }
    };

    if chart.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data for the current selection");
        });
        return;
    }

    let x_label = state
        .active
        .as_ref()
        .map(|ds| ds.dataset().period_column.clone())
        .unwrap_or_default();

    if chart.period.is_some() {
        cross_section(ui, state, chart);
    } else {
        trend(ui, state.chart_kind, chart, &x_label);
    }
}

fn to_color32(hex: &str) -> Color32 {
    parse_hex(hex)
        .map(|c| Color32::from_rgb(c.red, c.green, c.blue))
        .unwrap_or(Color32::GRAY)
}

/// Where periods sit on the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Every period is a year: plot at the year itself.
    Years,
    /// At least one labelled period: every period at its row index.
    RowIndex,
}

impl Axis {
    fn for_chart(chart: &ChartData) -> Axis {
        let labelled = chart
            .series
            .iter()
            .flat_map(|s| &s.points)
            .any(|p| matches!(p.period, Period::Label(_)));
        if labelled {
            Axis::RowIndex
        } else {
            Axis::Years
        }
    }

    fn x(self, period: &Period, index: usize) -> f64 {
        match (self, period) {
            (Axis::Years, Period::Year(y)) => *y as f64,
            _ => index as f64,
        }
    }
}

/// What to draw for one run of present values.
#[derive(Debug, Clone, PartialEq)]
enum Trace {
    Line(Vec<[f64; 2]>),
    /// A value isolated between gaps; a one-point line would be invisible.
    Marker([f64; 2]),
}

/// Contiguous runs of present values; a missing value ends a run so the
/// line shows a gap instead of dropping to zero.
fn traces(points: &[Point], axis: Axis) -> Vec<Trace> {
    let mut runs = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for (i, p) in points.iter().enumerate() {
        match p.value.as_f64() {
            Some(v) => current.push([axis.x(&p.period, i), v]),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs.into_iter()
        .map(|run| {
            if run.len() == 1 {
                Trace::Marker(run[0])
            } else {
                Trace::Line(run)
            }
        })
        .collect()
}

/// Period names for the row-index axis, taken from the longest series.
fn row_labels(chart: &ChartData) -> Vec<String> {
    chart
        .series
        .iter()
        .max_by_key(|s| s.points.len())
        .map(|s| s.points.iter().map(|p| p.period.to_string()).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Trend mode
// ---------------------------------------------------------------------------

fn trend(ui: &mut Ui, kind: ChartKind, chart: &ChartData, x_label: &str) {
    let axis = Axis::for_chart(chart);
    let mut plot = Plot::new("trend_plot")
        .legend(Legend::default())
        .x_axis_label(x_label);
    if axis == Axis::RowIndex {
        let names = row_labels(chart);
        plot = plot.x_axis_formatter(move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
            let idx = mark.value.round();
            if idx < 0.0 || (mark.value - idx).abs() > 1e-6 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        });
    }
    plot
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| match kind {
            ChartKind::Line | ChartKind::Area => {
                for s in &chart.series {
                    let color = to_color32(&s.color);
                    // Same name on every segment keeps one legend entry.
                    for trace in traces(&s.points, axis) {
                        match trace {
                            Trace::Line(run) => {
                                let mut line = Line::new(PlotPoints::from(run))
                                    .name(&s.label)
                                    .color(color)
                                    .width(2.0);
                                if kind == ChartKind::Area {
                                    line = line.fill(0.0);
                                }
                                plot_ui.line(line);
                            }
                            Trace::Marker(point) => plot_ui.points(
                                Points::new(vec![point])
                                    .radius(3.0)
                                    .name(&s.label)
                                    .color(color),
                            ),
                        }
                    }
                }
            }
            ChartKind::Bar => {
                let n = chart.series.len() as f64;
                let width = 0.8 / n;
                for (j, s) in chart.series.iter().enumerate() {
                    let offset = (j as f64 - (n - 1.0) / 2.0) * width;
                    let bars: Vec<Bar> = s
                        .points
                        .iter()
                        .enumerate()
                        .filter_map(|(i, p)| {
                            let v = p.value.as_f64()?;
                            Some(Bar::new(axis.x(&p.period, i) + offset, v).width(width))
                        })
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).name(&s.label).color(to_color32(&s.color)));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Cross-sectional mode
// ---------------------------------------------------------------------------

fn cross_section(ui: &mut Ui, state: &AppState, chart: &ChartData) {
    let period = chart.period.as_ref().map(|p| p.to_string()).unwrap_or_default();
    ui.heading(format!("Period {period}"));

    let plot_height = ui.available_height() * 0.6;
    Plot::new("cross_section_plot")
        .legend(Legend::default())
        .height(plot_height)
        .show_x(false)
        .show(ui, |plot_ui| {
            for (i, s) in chart.series.iter().enumerate() {
                let Some(v) = s.points.first().and_then(|p| p.value.as_f64()) else {
                    continue;
                };
                let bar = Bar::new(i as f64, v).width(0.7).name(&s.label);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(&s.label).color(to_color32(&s.color)));
            }
        });

    ui.separator();
    ui.strong("Breakdown");
    breakdown_table(ui, state, &chart.series);
}

fn breakdown_table(ui: &mut Ui, state: &AppState, series: &[ChartSeries]) {
    let total: f64 = state.breakdown.iter().map(|s| s.value).sum();

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder())
        .column(Column::auto())
        .column(Column::auto())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Series");
            });
            header.col(|ui| {
                ui.strong("Value");
            });
            header.col(|ui| {
                ui.strong("Share");
            });
        })
        .body(|mut body| {
            for slice in &state.breakdown {
                let label = series
                    .iter()
                    .find(|s| s.key == slice.key)
                    .map(|s| s.label.as_str())
                    .unwrap_or(slice.column.as_str());
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(label);
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.3}", slice.value));
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.1}%", 100.0 * slice.value / total));
                    });
                });
            }
        });
}
