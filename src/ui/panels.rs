use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use dolphot_explorer::data::export::write_csv;
use dolphot_explorer::data::filter::RangeBound;
use dolphot_explorer::data::loader::load_catalog;
use dolphot_explorer::state::MARKER_SIZE_RANGE;
use dolphot_explorer::{AppState, ControlEvent, Statistic};

// ---------------------------------------------------------------------------
// Left side panel – control widgets
// ---------------------------------------------------------------------------

/// Render the control panel. Edits are collected and applied after the
/// widgets are drawn, one transition each.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let mut events: Vec<ControlEvent> = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            selectors(ui, state, &mut events);
            ui.separator();
            toggles(ui, state, &mut events);
            ui.separator();
            range_sliders(ui, state, &mut events);
            ui.separator();
            limits_table(ui, state);
        });

    for event in events {
        state.dispatch(event);
    }
}

fn combo(
    ui: &mut Ui,
    id: &str,
    title: &str,
    current: &str,
    options: &[String],
) -> Option<String> {
    let mut picked = None;
    ui.strong(title);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                if ui.selectable_label(current == option, option).clicked() {
                    picked = Some(option.clone());
                }
            }
        });
    picked
}

fn selectors(ui: &mut Ui, state: &AppState, events: &mut Vec<ControlEvent>) {
    let controls = &state.controls;

    let pair_names: Vec<String> = state.source.pairs.iter().map(|p| p.to_string()).collect();
    if let Some(name) = combo(
        ui,
        "pair",
        "filter combination",
        &controls.pair.to_string(),
        &pair_names,
    ) {
        if let Some(pair) = state.source.pairs.iter().find(|p| p.to_string() == name) {
            events.push(ControlEvent::SelectPair(pair.clone()));
        }
    }

    let columns = state.columns();
    if let Some(col) = combo(ui, "x_axis", "x-axis", &controls.x_column, columns) {
        events.push(ControlEvent::SelectX(col));
    }
    if let Some(col) = combo(ui, "y_axis", "y-axis", &controls.y_column, columns) {
        events.push(ControlEvent::SelectY(col));
    }

    let mut color_options = vec!["None".to_string()];
    color_options.extend(columns.iter().cloned());
    let current = controls.color_by.as_deref().unwrap_or("None");
    if let Some(col) = combo(ui, "color_by", "color by", current, &color_options) {
        let col = (col != "None").then_some(col);
        events.push(ControlEvent::ColorBy(col));
    }

    let mut size = controls.marker_size;
    let slider = egui::Slider::new(&mut size, MARKER_SIZE_RANGE)
        .step_by(0.1)
        .text("marker size");
    if ui.add(slider).changed() {
        events.push(ControlEvent::MarkerSize(size));
    }
}

fn toggles(ui: &mut Ui, state: &AppState, events: &mut Vec<ControlEvent>) {
    let controls = &state.controls;
    ui.horizontal(|ui: &mut Ui| {
        let mut invert_x = controls.invert_x;
        if ui.toggle_value(&mut invert_x, "Invert x-axis").changed() {
            events.push(ControlEvent::InvertX(invert_x));
        }
        let mut invert_y = controls.invert_y;
        if ui.toggle_value(&mut invert_y, "Invert y-axis").changed() {
            events.push(ControlEvent::InvertY(invert_y));
        }
    });
    let mut show_cmd = controls.show_cmd;
    if ui.checkbox(&mut show_cmd, "Color-magnitude diagram").changed() {
        events.push(ControlEvent::ShowCmd(show_cmd));
    }
}

fn range_sliders(ui: &mut Ui, state: &AppState, events: &mut Vec<ControlEvent>) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Filters");
        if ui.small_button("Reset").clicked() {
            events.push(ControlEvent::ResetBounds(state.limits));
        }
    });

    for stat in Statistic::ALL {
        let limits = state.limits.get(stat);
        let current = state.controls.bounds.get(stat);
        let (mut lo, mut hi) = (current.min, current.max);

        ui.label(format!("{stat} range"));
        let range = limits.min..=limits.max;
        let lo_changed = ui
            .add(
                egui::Slider::new(&mut lo, range.clone())
                    .step_by(stat.step())
                    .text("min"),
            )
            .changed();
        let hi_changed = ui
            .add(egui::Slider::new(&mut hi, range).step_by(stat.step()).text("max"))
            .changed();
        if lo_changed || hi_changed {
            events.push(ControlEvent::SetBound(stat, RangeBound::new(lo, hi)));
        }
    }
}

fn limits_table(ui: &mut Ui, state: &AppState) {
    ui.collapsing("Slider limits", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::remainder())
            .header(18.0, |mut header| {
                for title in ["", "detected", "selected"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for stat in Statistic::ALL {
                    let limits = state.limits.get(stat);
                    let current = state.controls.bounds.get(stat);
                    body.row(16.0, |mut row| {
                        row.col(|ui| {
                            ui.label(stat.suffix());
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.2} – {:.2}", limits.min, limits.max));
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.2} – {:.2}", current.min, current.max));
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export selection…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{}: {} sources loaded, {} shown",
            state.source.target,
            state.source.catalog.len(),
            state.visible_rows.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open DOLPHOT catalog")
        .add_filter("FITS", &["fits", "FITS"])
        .pick_file();

    if let Some(path) = file {
        match load_catalog(&path).and_then(|loaded| state.set_catalog(loaded)) {
            Ok(()) => log::info!("Opened {}", path.display()),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

fn export(state: &AppState, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(&state.source.catalog, &state.visible_rows, BufWriter::new(file))
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export selected sources")
        .add_filter("CSV", &["csv"])
        .set_file_name(format!("{}_selection.csv", state.source.target))
        .save_file();

    if let Some(path) = file {
        match export(state, &path) {
            Ok(()) => {
                log::info!(
                    "Exported {} sources to {}",
                    state.visible_rows.len(),
                    path.display()
                );
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
