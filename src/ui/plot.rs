use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use eframe::egui::Ui;
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use startup_benchmark::data::aggregate::format_thousands;
use startup_benchmark::data::project::{BubblePoint, TimelinePoint};
use startup_benchmark::state::AppState;

const PLOT_HEIGHT: f32 = 320.0;
const MIN_RADIUS: f32 = 4.0;
const MAX_RADIUS: f32 = 22.0;

/// Marker radius for a bubble, area-proportional to `size / max`.
fn radius(size: f64, max: f64) -> f32 {
    if max <= 0.0 || size <= 0.0 {
        return MIN_RADIUS;
    }
    MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * (size / max).sqrt() as f32
}

fn or_dash(v: Option<f64>, decimals: usize) -> String {
    v.map(|v| format_thousands(v, decimals))
        .unwrap_or_else(|| "—".to_string())
}

// ---------------------------------------------------------------------------
// Bubble chart: LTV/CAC vs funding
// ---------------------------------------------------------------------------

pub fn bubble_chart(ui: &mut Ui, state: &AppState, bubbles: &[BubblePoint]) {
    let max_size = bubbles.iter().map(|b| b.size).fold(0.0, f64::max);

    // Hover lookup needs an owned copy: the formatter must be 'static.
    let hover: Vec<BubblePoint> = bubbles.to_vec();

    Plot::new("bubble_plot")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label("LTV/CAC (x)")
        .y_axis_label("Funding total (USD M)")
        .label_formatter(move |_series, point| {
            hover
                .iter()
                .find(|b| b.x == point.x && b.y == point.y)
                .map(|b| {
                    format!(
                        "{}\n{} · {}\nEmployees: {}\nGross margin: {}%\nARR (USD M): {}",
                        b.name,
                        b.country.as_deref().unwrap_or("—"),
                        b.stage.as_deref().unwrap_or("—"),
                        or_dash(b.employees, 0),
                        or_dash(b.gross_margin_pct, 1),
                        or_dash(b.arr_usd_m, 2),
                    )
                })
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for b in bubbles {
                // Same series name per industry, so the legend groups them.
                let points = Points::new(PlotPoints::from(vec![[b.x, b.y]]))
                    .name(&b.color)
                    .color(state.industry_colors.color_for(&b.color))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(radius(b.size, max_size));
                plot_ui.points(points);
            }
        });
}

// ---------------------------------------------------------------------------
// Timeline: rounds per company over time
// ---------------------------------------------------------------------------

fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

pub fn timeline_chart(ui: &mut Ui, state: &AppState, timeline: &[TimelinePoint]) {
    // One row per company, alphabetical from the top.
    let companies: Vec<String> = timeline
        .iter()
        .map(|p| p.company.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();
    let row_of = |name: &str| companies.iter().position(|c| c == name).unwrap_or(0) as f64;
    let max_size = timeline.iter().map(|p| p.size).fold(0.0, f64::max);

    let y_labels = companies.clone();
    let hover: Vec<TimelinePoint> = timeline.to_vec();
    let hover_rows = companies.clone();

    Plot::new("timeline_plot")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Startup")
        .x_axis_formatter(|mark, _range| x_to_label(mark.value))
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            y_labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .label_formatter(move |_series, point| {
            hover
                .iter()
                .find(|p| {
                    date_to_x(p.date) == point.x
                        && hover_rows.get(point.y.round() as usize) == Some(&p.company)
                })
                .map(|p| {
                    format!(
                        "{}\n{} · {}\nAmount (USD): {}",
                        p.company,
                        p.date.format("%Y-%m-%d"),
                        p.color,
                        format_thousands(p.size, 0)
                    )
                })
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for p in timeline {
                let points = Points::new(PlotPoints::from(vec![[date_to_x(p.date), row_of(&p.company)]]))
                    .name(&p.color)
                    .color(state.round_type_colors.color_for(&p.color))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(radius(p.size, max_size));
                plot_ui.points(points);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_is_bounded() {
        assert_eq!(radius(0.0, 10.0), MIN_RADIUS);
        assert_eq!(radius(10.0, 10.0), MAX_RADIUS);
        assert!(radius(2.5, 10.0) > MIN_RADIUS);
        assert_eq!(radius(5.0, 0.0), MIN_RADIUS);
    }

    #[test]
    fn date_axis_labels_round_trip() {
        let date = NaiveDate::from_ymd_opt(2021, 11, 3).unwrap();
        assert_eq!(x_to_label(date_to_x(date)), "2021-11");
    }
}
