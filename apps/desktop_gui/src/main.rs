mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{load_client_settings, view::APP_TITLE, SubmitPolicy};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::KodersApp;

#[derive(Parser, Debug)]
#[command(name = "koders-desktop")]
struct Args {
    /// Base URL of the koders API; overrides koders.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    submit_policy: Option<SubmitPolicy>,
}

/// `RUST_LOG` when set and valid, `info` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter()).init();
    let args = Args::parse();

    let mut settings = load_client_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(policy) = args.submit_policy {
        settings.submit_policy = policy;
    }
    let policy = settings.submit_policy;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([720.0, 640.0])
            .with_min_inner_size([480.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(KodersApp::new(cmd_tx, ui_rx, policy)))),
    )
}
