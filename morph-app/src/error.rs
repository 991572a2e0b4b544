use morph_core::MorphError;
use morph_snapshot::LoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Grid Error: {0}")]
    Core(#[from] MorphError),

    #[error("Snapshot Error: {0}")]
    Snapshot(#[from] LoadError),

    #[error("Render Error: {0}")]
    Render(String),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Wraps a drawing backend failure.
    pub fn render(err: impl std::fmt::Display) -> Self {
        Self::Render(err.to_string())
    }
}
