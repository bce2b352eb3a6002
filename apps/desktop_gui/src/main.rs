use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{
    config::{load_directory, load_settings, load_settings_from},
    BookingApi, HttpBookingClient,
};
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::BookingApp;

#[derive(Parser, Debug)]
#[command(about = "Desktop appointment booking form")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    directory: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(directory) = args.directory {
        settings.directory_path = Some(directory);
    }

    let directory_path = settings.directory_path.clone().context(
        "no doctor directory configured; pass --directory or set BOOKING_DIRECTORY",
    )?;
    let directory = Arc::new(load_directory(&directory_path)?);
    let api: Arc<dyn BookingApi> = Arc::new(HttpBookingClient::new(
        &settings.server_url,
        settings.request_timeout(),
    )?);
    tracing::info!("booking against {}", settings.server_url);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(api, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Appointment Booking")
            .with_inner_size([960.0, 620.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Appointment Booking",
        options,
        Box::new(move |_cc| Ok(Box::new(BookingApp::new(cmd_tx, ui_rx, directory)))),
    )
    .map_err(|err| anyhow!("failed to run desktop window: {err}"))
}
