//! Module defining readers for the supported snapshot file formats.

// Export the core reader trait
pub mod parser;
pub use parser::SnapshotFormat;

#[cfg(feature = "hdf5")]
pub mod hdf5_format;
#[cfg(feature = "hdf5")]
pub use hdf5_format::Hdf5Format;

/// All readers compiled into this build.
#[must_use]
pub fn available_formats() -> Vec<Box<dyn SnapshotFormat>> {
    #[allow(unused_mut)]
    let mut formats: Vec<Box<dyn SnapshotFormat>> = Vec::new();
    #[cfg(feature = "hdf5")]
    formats.push(Box::new(Hdf5Format::new()));
    formats
}
