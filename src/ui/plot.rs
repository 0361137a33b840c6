use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::color::outcome_color;
use crate::data::aggregate::{PieChart, ScatterPoint};
use crate::state::AppState;

/// Arc resolution of a quarter-turn pie piece.
const SEGMENTS_PER_PIECE: usize = 24;

/// Largest fraction of a turn drawn as one polygon; egui only fills convex shapes.
const MAX_PIECE: f64 = 0.25;

// ---------------------------------------------------------------------------
// Central panel: pie above scatter
// ---------------------------------------------------------------------------

pub fn charts(ui: &mut Ui, state: &AppState) {
    let chart_height = (ui.available_height() / 2.0 - 40.0).max(120.0);
    success_pie(ui, &state.pie, chart_height);
    ui.separator();
    payload_scatter(ui, state, chart_height);
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

fn success_pie(ui: &mut Ui, pie: &PieChart, height: f32) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(&pie.title);
    });

    Plot::new("success_pie")
        .height(height)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.2)
        .include_x(1.2)
        .include_y(-1.1)
        .include_y(1.1)
        .show(ui, |plot_ui| {
            let total = pie.total();
            if total == 0 {
                plot_ui.text(Text::new(PlotPoint::new(0.0, 0.0), "No launches"));
                return;
            }

            let mut start = 0.0;
            for (outcome, count) in pie.slices() {
                let end = start + count as f64 / total as f64;
                let color = outcome_color(outcome);
                for piece in pie_pieces(start, end) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .name(outcome.to_string())
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                }

                let [x, y] = turn_to_xy((start + end) / 2.0, 0.6);
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x, y),
                        format!("{:.1}%", (end - start) * 100.0),
                    )
                    .color(Color32::WHITE),
                );
                start = end;
            }
        });
}

/// Point on a circle of `radius` at `turn` (fraction of a revolution,
/// clockwise from twelve o'clock).
fn turn_to_xy(turn: f64, radius: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 - turn * TAU;
    [radius * angle.cos(), radius * angle.sin()]
}

/// Closed wedge of the unit circle between two turn fractions: centre, then the arc.
fn wedge_points(start: f64, end: f64, segments: usize) -> Vec<[f64; 2]> {
    let segments = segments.max(1);
    let mut points = Vec::with_capacity(segments + 2);
    points.push([0.0, 0.0]);
    for i in 0..=segments {
        let t = start + (end - start) * i as f64 / segments as f64;
        points.push(turn_to_xy(t, 1.0));
    }
    points
}

/// Split a slice into convex wedges of at most a quarter turn each.
fn pie_pieces(start: f64, end: f64) -> Vec<Vec<[f64; 2]>> {
    if end <= start {
        return Vec::new();
    }
    let n = ((end - start) / MAX_PIECE).ceil().max(1.0) as usize;
    let step = (end - start) / n as f64;
    (0..n)
        .map(|i| {
            let a = start + step * i as f64;
            let b = if i + 1 == n { end } else { a + step };
            wedge_points(a, b, SEGMENTS_PER_PIECE)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scatter chart
// ---------------------------------------------------------------------------

fn payload_scatter(ui: &mut Ui, state: &AppState, height: f32) {
    let chart = &state.scatter;
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(&chart.title);
    });

    let hover_points = chart.points.clone();

    Plot::new("payload_scatter")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Payload Mass (kg)")
        .y_axis_label("class")
        .include_x(state.slider.min)
        .include_x(state.slider.max)
        .include_y(-0.25)
        .include_y(1.25)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |name, value| hover_label(&hover_points, name, value.x, value.y))
        .show(ui, |plot_ui| {
            for (category, points) in chart.by_category() {
                let series: PlotPoints = points
                    .iter()
                    .map(|p| [p.payload_mass_kg, p.outcome.as_class()])
                    .collect();

                plot_ui.points(
                    Points::new(series)
                        .name(category)
                        .color(state.color_map.color_for(category))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(5.0),
                );
            }
        });
}

/// Tooltip for the launch under the cursor.
fn hover_label(points: &[ScatterPoint], category: &str, x: f64, y: f64) -> String {
    if category.is_empty() {
        return format!("{x:.0} kg");
    }
    let hit = points.iter().find(|p| {
        p.booster_category == category && p.payload_mass_kg == x && p.outcome.as_class() == y
    });
    match hit {
        Some(p) => {
            let mut label = format!("{category}\n{:.0} kg\n{}", p.payload_mass_kg, p.outcome);
            if let Some(n) = p.flight_number {
                label.push_str(&format!("\nFlight {n}"));
            }
            if let Some(v) = &p.booster_version {
                label.push_str(&format!("\n{v}"));
            }
            label
        }
        None => format!("{category}\n{x:.0} kg"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Outcome;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    #[test]
    fn test_turn_to_xy_starts_at_twelve_clockwise() {
        assert!(close(turn_to_xy(0.0, 1.0), [0.0, 1.0]));
        assert!(close(turn_to_xy(0.25, 1.0), [1.0, 0.0]));
        assert!(close(turn_to_xy(0.5, 2.0), [0.0, -2.0]));
    }

    #[test]
    fn test_wedge_points() {
        let pts = wedge_points(0.0, 0.25, 4);
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], [0.0, 0.0]);
        assert!(close(pts[1], [0.0, 1.0]));
        assert!(close(pts[5], [1.0, 0.0]));
    }

    #[test]
    fn test_pie_pieces_are_at_most_a_quarter_turn() {
        assert_eq!(pie_pieces(0.0, 0.2).len(), 1);
        assert_eq!(pie_pieces(0.0, 0.8).len(), 4);
        assert_eq!(pie_pieces(0.0, 1.0).len(), 4);
        assert!(pie_pieces(0.5, 0.5).is_empty());

        let pieces = pie_pieces(0.1, 0.9);
        let last = pieces.last().unwrap();
        assert!(close(*last.last().unwrap(), turn_to_xy(0.9, 1.0)));
    }

    #[test]
    fn test_hover_label() {
        let points = vec![ScatterPoint {
            payload_mass_kg: 2490.0,
            outcome: Outcome::Success,
            booster_category: "FT".to_string(),
            flight_number: Some(30),
            booster_version: Some("F9 FT B1031.1".to_string()),
        }];
        let label = hover_label(&points, "FT", 2490.0, 1.0);
        assert_eq!(label, "FT\n2490 kg\nSuccess\nFlight 30\nF9 FT B1031.1");
        assert_eq!(hover_label(&points, "B4", 2490.0, 1.0), "B4\n2490 kg");
        assert_eq!(hover_label(&points, "", 1234.4, 0.5), "1234 kg");
    }
}
