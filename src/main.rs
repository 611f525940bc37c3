use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use diabetes_dashboard::app::DashboardApp;
use diabetes_dashboard::config::DashboardConfig;
use diabetes_dashboard::session::Session;
use diabetes_dashboard::{logging, report};
use eframe::egui;

/// Exploratory dashboard for the Pima Indians diabetes dataset.
#[derive(Parser, Debug)]
#[command(name = "diabetes-dashboard", version, about)]
struct Cli {
    /// TOML configuration file (defaults to ./dashboard.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data file for the active source, overriding the configuration
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Print the dashboard as Markdown instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.data {
        config.override_data_path(path);
    }

    let session = Session::start(config).inspect_err(|e| log::error!("{e}"))?;

    if cli.headless {
        print!("{}", report::render(&session));
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        report::TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(session)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
