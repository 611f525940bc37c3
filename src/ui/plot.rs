use std::f64::consts::TAU;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};

use crate::color::{outcome_color, ColorScale};
use crate::data::model::Outcome;
use crate::data::stats::{CorrelationMatrix, FeatureCorrelation, Histogram, OutcomeDistribution};
use crate::pipeline::ScatterSpec;

const PLOT_HEIGHT: f32 = 280.0;

/// Axis label for integer positions that index `names`.
fn category_label(names: &[String], mark: GridMark) -> String {
    let i = mark.value.round();
    if (mark.value - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    names.get(i as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Histogram overlaid by outcome
// ---------------------------------------------------------------------------

pub fn histogram(ui: &mut Ui, hist: &Histogram) {
    let width = hist.bin_width();
    let charts: Vec<BarChart> = Outcome::ALL
        .iter()
        .map(|&outcome| {
            let bars = hist
                .counts_for(outcome)
                .iter()
                .enumerate()
                .map(|(i, &count)| {
                    Bar::new(hist.edges[i] + width / 2.0, count as f64).width(width)
                })
                .collect();
            BarChart::new(bars)
                .name(outcome.label())
                .color(outcome_color(outcome).gamma_multiply(0.7))
        })
        .collect();

    Plot::new(format!("hist_{}", hist.field))
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(hist.field.as_str())
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Filtered scatter with optional trend line
// ---------------------------------------------------------------------------

pub fn scatter(ui: &mut Ui, spec: &ScatterSpec) {
    Plot::new("scatter")
        .height(PLOT_HEIGHT * 1.4)
        .legend(Legend::default())
        .x_axis_label(spec.x_feature.as_str())
        .y_axis_label(spec.y_feature.as_str())
        .allow_boxed_zoom(true)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for outcome in Outcome::ALL {
                let points: PlotPoints = spec
                    .points
                    .iter()
                    .filter(|p| p.outcome == outcome)
                    .map(|p| [p.x, p.y])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name(outcome.label())
                        .color(outcome_color(outcome))
                        .radius(3.0),
                );
            }

            if let Some(trend) = &spec.trend {
                let line: PlotPoints = [trend.x_min, trend.x_max]
                    .iter()
                    .map(|&x| [x, trend.y_at(x)])
                    .collect();
                plot_ui.line(
                    Line::new(line)
                        .name("OLS trend")
                        .color(Color32::DARK_GRAY)
                        .width(2.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

pub fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let scale = ColorScale::red_blue();
    let n = matrix.fields.len();
    let x_names = matrix.fields.clone();
    // Rows are drawn top-down, so y labels run in reverse.
    let y_names: Vec<String> = matrix.fields.iter().rev().cloned().collect();

    Plot::new("correlation_heatmap")
        .height(PLOT_HEIGHT * 1.6)
        .data_aspect(1.0)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| category_label(&x_names, mark))
        .y_axis_formatter(move |mark, _range| category_label(&y_names, mark))
        .show(ui, |plot_ui| {
            for i in 0..n {
                let y = (n - 1 - i) as f64;
                for j in 0..n {
                    let x = j as f64;
                    let r = matrix.get(i, j);
                    let cell: PlotPoints = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ]
                    .into();
                    plot_ui.polygon(
                        Polygon::new(cell)
                            .fill_color(scale.color_for(r))
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    let label = match r.value() {
                        Some(v) => format!("{v:.2}"),
                        None => "n/a".to_string(),
                    };
                    let text_color = if r.value().is_some_and(|v| v.abs() > 0.6) {
                        Color32::WHITE
                    } else {
                        Color32::BLACK
                    };
                    plot_ui.text(Text::new(PlotPoint::new(x, y), label).color(text_color));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Outcome pie chart
// ---------------------------------------------------------------------------

/// Pie slices approximated by polygons, starting at twelve o'clock.
pub fn outcome_pie(ui: &mut Ui, dist: &OutcomeDistribution) {
    let total = dist.total();
    Plot::new("outcome_pie")
        .height(PLOT_HEIGHT)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            if total == 0 {
                return;
            }
            let mut start = 0.0;
            for (outcome, count) in dist.slices() {
                let sweep = TAU * count as f64 / total as f64;
                let steps = ((sweep / TAU) * 96.0).ceil().max(1.0) as usize;
                let mut vertices = vec![[0.0, 0.0]];
                vertices.extend((0..=steps).map(|k| {
                    let a = start + sweep * k as f64 / steps as f64;
                    [a.sin(), a.cos()]
                }));
                let pct = 100.0 * count as f64 / total as f64;
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(vertices))
                        .name(format!("{} ({pct:.1}%)", outcome.label()))
                        .fill_color(outcome_color(outcome))
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );
                start += sweep;
            }
        });
}

// ---------------------------------------------------------------------------
// Feature importance bars
// ---------------------------------------------------------------------------

pub fn feature_importance(ui: &mut Ui, ranking: &[FeatureCorrelation]) {
    let scale = ColorScale::red_blue();
    let names: Vec<String> = ranking.iter().map(|f| f.field.clone()).collect();
    let bars: Vec<Bar> = ranking
        .iter()
        .enumerate()
        .map(|(i, f)| {
            Bar::new(i as f64, f.correlation.value().unwrap_or(0.0))
                .name(format!("{}: {}", f.field, f.correlation))
                .fill(scale.color_for(f.correlation))
                .width(0.8)
        })
        .collect();

    Plot::new("feature_importance")
        .height(PLOT_HEIGHT)
        .y_axis_label("Correlation with Outcome")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| category_label(&names, mark))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}
