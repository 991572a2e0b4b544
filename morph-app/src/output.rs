use crate::error::AppError;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// File name of the frame for snapshot `time`, e.g. `savename_042.png`.
pub fn frame_file_name(prefix: &str, time: u32) -> String {
    format!("{prefix}_{time:03}.png")
}

/// Directory receiving the frames of `snapshot_dir`.
///
/// A single series writes straight into `output_dir`; several series each get
/// a subdirectory named after their snapshot directory.
pub fn frame_output_dir(output_dir: &Path, snapshot_dir: &Path, several_series: bool) -> PathBuf {
    if !several_series {
        return output_dir.to_path_buf();
    }
    let name = snapshot_dir
        .file_name()
        .map_or_else(|| "series".into(), |n| n.to_string_lossy().into_owned());
    output_dir.join(name)
}

/// Creates `dir` and its parents if needed.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    Ok(())
}

/// One row of the statistics file: the finite range of one panel image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRecord {
    pub series: String,
    pub time: u32,
    pub field: &'static str,
    pub width: usize,
    pub height: usize,
    /// Empty when the image holds no finite value.
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Appends [`StatsRecord`]s to a CSV file.
///
/// The header row is written only when the file starts out empty, so several
/// runs can share one file.
pub struct StatsWriter {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
}

impl StatsWriter {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;
        let writer = csv::WriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);
        log::debug!("Writing frame statistics to {:?}", path);
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            rows: 0,
        })
    }

    pub fn write(&mut self, record: &StatsRecord) -> Result<(), AppError> {
        self.writer.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes buffered rows to disk.
    pub fn finish(mut self) -> Result<usize, AppError> {
        self.writer.flush()?;
        log::info!("Wrote {} statistics rows to {:?}", self.rows, self.path);
        Ok(self.rows)
    }
}
