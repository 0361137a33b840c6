mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use app::LaunchDashApp;
use config::{CONFIG_FILE, DashboardConfig};
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    run().inspect_err(|e| log::error!("{e:#}"))
}

fn run() -> Result<()> {
    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE))?;

    // An optional positional argument overrides the configured dataset.
    let data_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_path.clone());

    let dataset = data::loader::load_file(&data_path)
        .with_context(|| format!("loading launch records from {}", data_path.display()))?;
    log::info!(
        "Loaded {} launches from {} ({} sites, payload extent {:?})",
        dataset.len(),
        data_path.display(),
        dataset.sites.len(),
        dataset.payload_extent
    );

    let state = AppState::new(Arc::new(dataset), &config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Launch Records Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(LaunchDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
