//! Herdlog - Barn camera footage logger
//!
//! Entry point and main application loop.

mod app;

use anyhow::Result;
use app::HerdlogApp;
use eframe::egui;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Herdlog starting...");

    // Initialize media subsystem
    herdlog_media::init();

    // A camera folder can be passed straight from the shell
    let folder = std::env::args().nth(1).map(PathBuf::from);

    // Run the application
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title("Herdlog"),
        ..Default::default()
    };

    // eframe::Error is not Send + Sync, so it cannot cross `?` into anyhow.
    eframe::run_native(
        "Herdlog",
        options,
        Box::new(move |cc| Ok(Box::new(HerdlogApp::new(cc, folder)?))),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))?;

    Ok(())
}
