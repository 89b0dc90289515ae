use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use startup_benchmark::config::DashboardConfig;
use startup_benchmark::state::AppState;

use crate::ui::{panels, plot, table, treemap};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StartupBenchmarkApp {
    pub state: AppState,
}

impl StartupBenchmarkApp {
    /// Build the app and run the first load.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.reload();
        Self { state }
    }
}

impl eframe::App for StartupBenchmarkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &mut self.state);
        });
    }
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
}

fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if let Some(err) = &state.load_error {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(err).color(Color32::RED).size(16.0));
        });
        return;
    }
    let Some(view) = state.view.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data loaded  (File → Reload from disk)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(RichText::new(&state.config.title).size(24.0));
            ui.label(&state.config.caption);
            ui.add_space(8.0);

            panels::kpi_row(ui, state);
            ui.separator();

            section(ui, "LTV/CAC vs Funding total (bubble)");
            if view.bubbles.is_empty() {
                ui.label("No data for the selected filters.");
            } else {
                plot::bubble_chart(ui, state, &view.bubbles);
            }

            section(ui, "Funding round timeline");
            if view.timeline.is_empty() {
                ui.label("No rounds for the selected filters.");
            } else {
                plot::timeline_chart(ui, state, &view.timeline);
            }

            section(ui, "Revenue models (treemap)");
            if view.treemap.value <= 0.0 {
                ui.label("No data available for this chart.");
            } else {
                treemap::treemap_chart(ui, state, &view.treemap);
            }

            section(ui, "Startup comparison table");
            table::comparison_table(ui, state);

            ui.add_space(8.0);
            ui.small(&state.config.source_note);
        });
}
