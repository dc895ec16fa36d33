use std::hash::Hash;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Plot, PlotPoints, Points};

use dolphot_explorer::figure::ScatterFigure;
use dolphot_explorer::AppState;

// ---------------------------------------------------------------------------
// Scatter plots (central panel)
// ---------------------------------------------------------------------------

/// Render the free-axis plot and, when enabled, the CMD beside it.
pub fn figures(ui: &mut Ui, state: &AppState) {
    if state.visible_rows.is_empty() {
        ui.label(RichText::new("No sources pass the current filters").color(Color32::YELLOW));
    }

    let figs = &state.figures;
    let rev = state.revision;
    match &figs.cmd {
        Some(cmd) => {
            ui.columns(2, |cols: &mut [Ui]| {
                scatter_plot(&mut cols[0], ("scatter", rev), &figs.scatter);
                scatter_plot(&mut cols[1], ("cmd", rev), cmd);
            });
        }
        None => scatter_plot(ui, ("scatter", rev), &figs.scatter),
    }
}

fn format_tick(value: f64) -> String {
    let v = if value == 0.0 { 0.0 } else { value };
    format!("{}", (v * 1e6).round() / 1e6)
}

/// egui_plot has no inverted axes, so an inverted axis is drawn with negated
/// coordinates and relabelled.
fn scatter_plot(ui: &mut Ui, id: impl Hash, fig: &ScatterFigure) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(&fig.title);
    });

    let sx = if fig.x_range.is_inverted() { -1.0 } else { 1.0 };
    let sy = if fig.y_range.is_inverted() { -1.0 } else { 1.0 };
    let (x_label, y_label) = (fig.x_label.clone(), fig.y_label.clone());

    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label(fig.x_label.clone())
        .y_axis_label(fig.y_label.clone())
        .include_x(fig.x_range.start * sx)
        .include_x(fig.x_range.end * sx)
        .include_y(fig.y_range.start * sy)
        .include_y(fig.y_range.end * sy)
        .x_axis_formatter(move |mark, _range| format_tick(sx * mark.value))
        .y_axis_formatter(move |mark, _range| format_tick(sy * mark.value))
        .label_formatter(move |name, point| {
            let head = if name.is_empty() { String::new() } else { format!("{name}\n") };
            format!(
                "{head}{x_label} = {:.3}\n{y_label} = {:.3}",
                sx * point.x,
                sy * point.y
            )
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &fig.series {
                let points: PlotPoints = series
                    .points
                    .iter()
                    .map(|&[x, y]| [x * sx, y * sy])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&series.label)
                        .color(series.color)
                        .filled(true)
                        .radius(fig.marker_size / 2.0),
                );
            }
        });
}
