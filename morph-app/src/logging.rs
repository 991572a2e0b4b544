//! Logging setup for the application.

use crate::config::{AppConfig, GlobalLogLevel, ProgressLogLevel};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the logger from the application settings.
///
/// Progress reports use `config.progress_log_level`, everything else
/// `config.global_log_level`. Directives in `RUST_LOG` are parsed first, so
/// the explicit levels take precedence over them.
pub fn init_logger(config: &AppConfig) {
    let progress_level = match config.progress_log_level {
        ProgressLogLevel::Trace => LevelFilter::Trace,
        ProgressLogLevel::Debug => LevelFilter::Debug,
        ProgressLogLevel::Info => LevelFilter::Info,
        ProgressLogLevel::Warn => LevelFilter::Warn,
    };

    let global_level = match config.global_log_level {
        GlobalLogLevel::Trace => LevelFilter::Trace,
        GlobalLogLevel::Debug => LevelFilter::Debug,
        GlobalLogLevel::Info => LevelFilter::Info,
        GlobalLogLevel::Warn => LevelFilter::Warn,
        GlobalLogLevel::Error => LevelFilter::Error,
    };

    let env = Env::default().filter_or("RUST_LOG", "info");
    let mut builder = Builder::from_env(env);
    builder.filter_level(global_level);
    builder.filter_module("morph_app::progress", progress_level);

    // A second init (e.g. from tests) keeps the first logger.
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
        return;
    }

    log::debug!(
        "Logger initialized with global log level: {:?}, progress log level: {:?}",
        config.global_log_level,
        config.progress_log_level
    );
}
