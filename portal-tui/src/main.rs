mod app;
mod backend;
mod context;
mod error;
mod keys;
mod models;
mod paths;
mod settings;
mod tab;
mod terminal;

use std::fs::{self, File};

use simplelog::{Config, LevelFilter, WriteLogger};

use crate::app::App;
use crate::context::PortalContext;
use crate::error::AppError;
use crate::settings::Settings;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let settings = match paths::settings_file() {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    init_logging(settings.level_filter())?;

    let ctx = PortalContext::new(settings);
    App::new(&ctx)?.run().await
}

fn init_logging(level: LevelFilter) -> Result<(), AppError> {
    let removed = paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = File::create(&path)?;
    WriteLogger::init(level, Config::default(), file)?;
    if removed > 0 {
        log::debug!("Removed {} old log files", removed);
    }
    Ok(())
}
