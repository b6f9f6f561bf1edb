mod app;
mod color;
mod config;
mod data;
mod lasso;
mod router;
mod state;
mod ui;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use app::WineLensApp;
use clap::Parser;
use eframe::egui;

use config::{Cli, Config};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::resolve(&cli)?;

    // The dataset is loaded once, before any window exists.
    let path = match config.data.clone() {
        Some(path) => path,
        None => ui::panels::pick_dataset_file().context("no dataset selected")?,
    };
    let source = data::loader::load_file(&path, &config.load_options()?)
        .with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} rows with columns {:?}",
        source.len(),
        source.column_names().collect::<Vec<_>>()
    );
    config.data = Some(path);
    let source = Arc::new(source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(WineLensApp::new(config, source)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
