use crate::{LoadError, Snapshot};
use std::path::Path;

/// Trait defining the interface for format-specific snapshot readers.
///
/// Implementors read one snapshot file into its header and the raw,
/// block-ordered field buffers.
pub trait SnapshotFormat: Send + Sync {
    /// Reads a snapshot from `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(Snapshot)` - Header and primary fields, not yet reassembled
    /// * `Err(LoadError)` - Error encountered while reading
    fn read(&self, path: &Path) -> Result<Snapshot, LoadError>;

    /// Returns a descriptive name for this format.
    ///
    /// Used in logs and user-facing error messages.
    fn format_name(&self) -> &'static str;

    /// File extensions (without the dot) this reader handles.
    fn supported_extensions(&self) -> &'static [&'static str];

    /// Checks whether the extension is handled by this reader.
    fn supports(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
