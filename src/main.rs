mod analysis;
mod annotation;
mod app;
mod extract;
mod geometry;
mod gesture;
mod overlay;
mod page;
mod surface;
mod theme;
mod toolbar;

use std::fs::File;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::analysis::SimulatedAnalyzer;
use crate::page::PageModel;

#[derive(Parser)]
#[command(name = "lassonote", version, about = "Lasso-select and annotate a rendered document")]
struct Cli {
    /// Document to open. A built-in sample page is used when omitted.
    document: Option<PathBuf>,

    /// Where to write the debug log.
    #[arg(long, default_value = "lassonote.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("cannot create log file {}", cli.log_file.display()))?,
    )?;
    info!("starting lassonote");

    let page = match &cli.document {
        Some(path) => PageModel::load(path)?,
        None => PageModel::sample(),
    };
    info!("loaded document '{}' with {} fragments", page.title(), page.lines().len());

    let viewport = egui::ViewportBuilder::default()
        .with_title("LassoNote")
        .with_inner_size([1080.0, 760.0])
        .with_min_inner_size([640.0, 480.0]);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "LassoNote",
        options,
        Box::new(move |cc| {
            Box::new(app::LassoNoteApp::new(
                cc,
                page,
                Box::new(SimulatedAnalyzer::default()),
            ))
        }),
    )
    .map_err(|err| anyhow!("cannot start ui: {err}"))
}
