use std::path::PathBuf;

use anyhow::{Context, Result};
use eframe::egui;
use sales_lens::app::SalesLensApp;
use sales_lens::config::DashboardConfig;
use sales_lens::state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading dashboard config")?;
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let window = [config.window_width, config.window_height];

    let mut state = AppState::new(config);
    let dataset_path = explicit
        .clone()
        .unwrap_or_else(|| state.config.default_dataset.clone());
    if explicit.is_some() || dataset_path.exists() {
        if let Err(e) = state.load_path(&dataset_path) {
            log::error!("{e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    } else {
        log::warn!(
            "Default dataset {} not found, open a file to begin",
            dataset_path.display()
        );
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(window)
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Lens – Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalesLensApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
