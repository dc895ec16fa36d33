mod app;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use app::DolphotExplorerApp;
use dolphot_explorer::data::loader;
use dolphot_explorer::{AppState, DiscoveryRule};

#[derive(Parser)]
#[command(name = "dolphot-explorer")]
#[command(about = "Interactive explorer for DOLPHOT photometry catalogs", long_about = None)]
struct Cli {
    /// FITS catalog to open; when omitted the scan directory is searched
    fitsfile: Option<PathBuf>,

    /// Directory searched for a catalog when none is given
    #[arg(long, default_value = "./gst")]
    scan_dir: PathBuf,

    /// Substring the discovered catalog's path must contain
    #[arg(long, default_value = "HODGE6.gst.fits")]
    pattern: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let rule = DiscoveryRule {
        dir: cli.scan_dir,
        pattern: cli.pattern,
    };
    let loaded = loader::open(cli.fitsfile.as_deref(), &rule).context("loading catalog")?;
    let state = AppState::new(loaded).context("initialising controls")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "DOLPHOT Parameter Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(DolphotExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with error: {e}"))
}
