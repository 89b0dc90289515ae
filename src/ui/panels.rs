use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use startup_benchmark::data::filter::Category;
use startup_benchmark::data::loader::Upload;
use startup_benchmark::data::project::MISSING_LABEL;
use startup_benchmark::state::{AppState, UploadSlot};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let options = match &state.dataset {
        Some(ds) => ds.companies.options.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    if state.selection.is_identity(&options) {
        ui.small("Showing every company");
    } else {
        ui.small(RichText::new("Filters active").color(Color32::LIGHT_BLUE));
    }
    ui.add_space(4.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for category in Category::ALL {
                let all_values = options.values(category);
                let n_selected = state.selection.selected(category).len();
                let header_text = format!("{}  ({n_selected}/{})", category.label(), all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(category.label())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(category);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(category);
                            }
                        });

                        for value in all_values {
                            let mut checked = state.selection.selected(category).contains(value);
                            let mut text = RichText::new(value);
                            if category == Category::Industry {
                                text = text.color(state.industry_colors.color_for(value));
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(category, value);
                            }
                        }

                        if options.has_missing(category) {
                            let mut checked = state.selection.admits_missing(category);
                            let text = RichText::new(MISSING_LABEL).italics();
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_missing_filter(category);
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
            if ui.button("Upload companies…").clicked() {
                upload_dialog(state, UploadSlot::Companies);
                ui.close_menu();
            }
            if ui.button("Upload rounds…").clicked() {
                upload_dialog(state, UploadSlot::Rounds);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload from disk").clicked() {
                state.reload_from_disk();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} startups loaded, {} visible, {} rounds",
                ds.companies.len(),
                view.kpis.startups,
                view.timeline.len()
            ));
        }

        for (slot, upload) in [
            ("companies", &state.uploads.companies),
            ("rounds", &state.uploads.rounds),
        ] {
            if let Some(upload) = upload {
                ui.separator();
                ui.label(format!("{slot}: {}", upload.name));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::YELLOW));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        return;
    };
    let kpis = &view.kpis;
    let cards = [
        ("Startups", kpis.startups.to_string()),
        ("Funding total (USD M)", kpis.funding_label()),
        ("Mean ARR (USD M)", kpis.arr_label()),
        ("Mean LTV/CAC", kpis.ltv_cac_label()),
    ];

    ui.columns(cards.len(), |columns| {
        for (col, (label, value)) in columns.iter_mut().zip(cards) {
            col.label(label);
            col.heading(RichText::new(value).strong().size(26.0));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

fn pick_upload(slot: UploadSlot) -> anyhow::Result<Option<Upload>> {
    let title = match slot {
        UploadSlot::Companies => "Upload company profiles",
        UploadSlot::Rounds => "Upload funding rounds",
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file()
    else {
        return Ok(None);
    };

    let upload = Upload::from_path(&path)
        .with_context(|| format!("reading upload {}", path.display()))?;
    Ok(Some(upload))
}

pub fn upload_dialog(state: &mut AppState, slot: UploadSlot) {
    match pick_upload(slot) {
        Ok(Some(upload)) => state.set_upload(slot, upload),
        Ok(None) => {}
        Err(e) => {
            log::error!("Failed to read upload: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
