//! disc-morph application library
//!
//! Configuration, logging, rendering and the snapshot-to-frame pipeline
//! behind the `disc-morph` binary.

pub mod colormap;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod profiler;
pub mod progress;
pub mod setup;
pub mod visualization;

// Include main.rs as a module
pub mod main;

pub use config::{AppConfig, RenderSettings};
pub use error::AppError;

// Re-export the main function so it can be called from the root crate
pub use crate::main::main;
