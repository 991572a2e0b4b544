//! Reads simulation snapshots and hands their fields to `morph-core`.

use morph_core::MorphError;
use thiserror::Error;

pub mod formats;
pub mod literal;
pub mod loader;
pub mod types;

pub use loader::{load_from_file, snapshot_file_name};
pub use types::{Snapshot, SnapshotHeader};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
    #[error("Missing {kind} '{name}'")]
    MissingItem { kind: &'static str, name: String },
    #[error("Failed to parse parameter value: {0}")]
    ParseError(String),
    #[error("Invalid snapshot data: {0}")]
    InvalidData(String),
    #[error("No snapshot reader for '{0}'")]
    UnsupportedFormat(String),
    #[error("Grid error: {0}")]
    Grid(#[from] MorphError),
}
