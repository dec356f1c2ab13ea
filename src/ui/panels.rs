use std::path::PathBuf;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::export::{Download, ToCsv};
use crate::data::model::Dimension;
use crate::state::{AppState, FILTER_DIMENSIONS};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Choose Your Filter");
    ui.separator();

    let Some(criteria) = state.criteria.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    // ---- Date window ----
    let mut date_from = criteria.date_from;
    let mut date_to = criteria.date_to;
    egui::Grid::new("date_window").show(ui, |ui: &mut Ui| {
        ui.label("Start Date");
        ui.add(DatePickerButton::new(&mut date_from).id_salt("start_date"));
        ui.end_row();
        ui.label("End Date");
        ui.add(DatePickerButton::new(&mut date_to).id_salt("end_date"));
        ui.end_row();
    });
    state.set_date_range(date_from, date_to);
    if date_from > date_to {
        ui.label(RichText::new("Start date is after end date.").color(Color32::YELLOW));
    }
    ui.separator();

    // Clone so we can mutate state inside the loop.
    let options = state.options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in FILTER_DIMENSIONS {
                let Some(values) = options.get(&dim) else {
                    continue;
                };

                let n_selected = values
                    .iter()
                    .filter(|v| state.is_selected(dim, v))
                    .count();
                let header_text = if n_selected == 0 {
                    format!("{dim}  (all {})", values.len())
                } else {
                    format!("{dim}  ({n_selected}/{})", values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.column_name())
                    .default_open(dim == Dimension::Region)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() {
                            state.clear_selection(dim);
                        }
                        for val in values {
                            let mut checked = state.is_selected(dim, val);
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                state.toggle_selection(dim, val);
                            }
                        }
                    });
            }
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
            if state.dataset.is_some() && ui.button("Download Original Data…").clicked() {
                let rows = state.date_window_rows();
                offer_download(&mut state.status_message, "Original_Dataset.csv", rows.as_slice());
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                state.filtered.len()
            ));
        }

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
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "txt", "json", "parquet", "pq"])
        .add_filter("Delimited text", &["csv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_path(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn save_with_dialog(download: &Download) -> Result<Option<PathBuf>> {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save CSV")
        .set_file_name(&download.file_name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return Ok(None);
    };
    download
        .save_to(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(Some(path))
}

/// Serialise `data` and ask where to save it. Failures land in the status bar.
pub fn offer_download<T: ToCsv + ?Sized>(status: &mut Option<String>, file_name: &str, data: &T) {
    let result = Download::csv(file_name, data)
        .with_context(|| format!("exporting {file_name}"))
        .and_then(|download| save_with_dialog(&download));

    match result {
        Ok(Some(path)) => {
            log::info!("Saved {file_name} to {}", path.display());
            *status = None;
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Download failed: {e:#}");
            *status = Some(format!("Error: {e:#}"));
        }
    }
}

/// A "Download Data" button wired to [`offer_download`].
pub fn download_button<T: ToCsv + ?Sized>(
    ui: &mut Ui,
    status: &mut Option<String>,
    label: &str,
    file_name: &str,
    data: &T,
) {
    if ui.button(label).clicked() {
        offer_download(status, file_name, data);
    }
}
