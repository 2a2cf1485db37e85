use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::data::report::View;
use crate::data::season::SeasonFilter;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filters and navigation
// ---------------------------------------------------------------------------

/// Render the left filter / navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    match state.filter {
        Some(_) if state.data.as_ref().is_some_and(|d| d.orders.is_empty()) => {
            ui.label("Dataset has no orders to filter.");
        }
        Some(filter) => {
            ui.strong("Start Date");
            let mut start = filter.start;
            ui.add(DatePickerButton::new(&mut start).id_salt("start_date"));
            if start != filter.start {
                state.set_start(start);
            }

            ui.strong("End Date");
            let mut end = filter.end;
            ui.add(DatePickerButton::new(&mut end).id_salt("end_date"));
            if end != filter.end {
                state.set_end(end);
            }

            if start > end {
                ui.label(RichText::new("Start date is after end date").color(Color32::YELLOW));
            }

            ui.add_space(4.0);
            ui.strong("Select Season");
            let mut season = filter.season;
            egui::ComboBox::from_id_salt("season")
                .selected_text(season.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for choice in SeasonFilter::choices() {
                        ui.selectable_value(&mut season, choice, choice.label());
                    }
                });
            if season != filter.season {
                state.set_season(season);
            }

            ui.add_space(4.0);
            if ui.small_button("Reset").clicked() {
                state.reset_filter();
            }
        }
        None => {
            ui.label("No dataset loaded.");
        }
    }

    ui.add_space(12.0);
    ui.heading("Navigation");
    ui.separator();

    let mut view = state.view;
    for choice in View::ALL {
        ui.radio_value(&mut view, choice, choice.title());
    }
    state.set_view(view);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.report.is_some(), egui::Button::new("Export report…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(data) = &state.data {
            let counts: Vec<String> = data
                .tables
                .row_counts()
                .iter()
                .map(|(table, n)| format!("{n} {table}"))
                .collect();
            ui.label(counts.join(" · "));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open e-commerce dataset folder")
        .pick_folder();

    if let Some(dir) = folder {
        state.open_dir(&dir);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file_name = format!("{}.json", state.view.title().to_lowercase().replace(' ', "_"));
    let target = rfd::FileDialog::new()
        .set_title("Export report")
        .set_file_name(file_name)
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = target {
        state.export(&path);
    }
}
