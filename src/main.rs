mod app;
mod ui;

use anyhow::Context;
use app::StartupBenchmarkApp;
use eframe::egui;
use startup_benchmark::config::DashboardConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env().context("reading dashboard configuration")?;
    let title = config.title.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(StartupBenchmarkApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
