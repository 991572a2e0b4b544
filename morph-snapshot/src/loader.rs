use crate::formats::available_formats;
use crate::{LoadError, Snapshot};
use std::path::Path;

/// File name of the snapshot with the given index, e.g.
/// `disc_patch_reference_042.hdf5`.
#[must_use]
pub fn snapshot_file_name(prefix: &str, index: u32) -> String {
    format!("{prefix}_{index:03}.hdf5")
}

/// Loads a snapshot from a file.
///
/// The reader is chosen by file extension among the formats compiled into
/// this build.
///
/// # Arguments
///
/// * `path` - The path to the snapshot file.
///
/// # Returns
///
/// The snapshot's header and primary fields in stored (block) order, or a
/// `LoadError` on failure.
pub fn load_from_file(path: &Path) -> Result<Snapshot, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !path.exists() {
        return Err(LoadError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Snapshot file not found: {}", path.display()),
        )));
    }

    let format = available_formats()
        .into_iter()
        .find(|format| format.supports(&extension))
        .ok_or_else(|| LoadError::UnsupportedFormat(path.display().to_string()))?;

    log::debug!("Reading {} snapshot {:?}", format.format_name(), path);
    let snapshot = format.read(path)?;
    log::debug!(
        "Loaded {} cells from {:?}",
        snapshot.header.grid.volume(),
        path
    );
    Ok(snapshot)
}
