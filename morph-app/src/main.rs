// morph-app/src/main.rs

use crate::config::{AppConfig, RenderSettings};
use crate::logging;
use crate::setup::execution;
use anyhow::{Context, Result};
use clap::Parser;

/// Parses the command line, loads render settings and runs the pipeline.
pub fn main() -> Result<()> {
    let config = AppConfig::parse();
    logging::init_logger(&config);

    log::info!("disc-morph starting");
    log::debug!("Loaded Config: {:?}", config);

    let settings = RenderSettings::load(config.config.as_deref())
        .context("Failed to load render settings")?;
    log::debug!("Render settings: {:?}", settings);

    let summary = execution::run(&config, &settings).context("Rendering run failed")?;
    log::info!(
        "disc-morph finished: {} rendered, {} skipped",
        summary.rendered,
        summary.skipped
    );
    Ok(())
}
