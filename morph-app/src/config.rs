use crate::colormap::{ColormapKind, NormSpec};
use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use morph_core::{DerivedField, SpatialAxis};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix of environment variables overriding render settings.
pub const ENV_PREFIX: &str = "DISC_MORPH_";

/// How each panel image is taken from the 3D fields.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageMode {
    /// Mean along the line of sight, weighted by number density.
    #[default]
    Projection,
    /// A single plane across the line of sight.
    Slice,
}

/// Where frames go.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RendererKind {
    /// PNG files.
    #[default]
    Plotters,
    /// Text summary on stdout, no files.
    Terminal,
}

/// Defines the log level for progress reporting.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
}

/// Defines the global log level for the application.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Output image size in pixels, written `WxH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

/// Parses a `WxH` string such as `256x1536`.
pub fn parse_resolution(text: &str) -> Result<Resolution, AppError> {
    let parts: Vec<&str> = text.split(['x', 'X']).collect();
    if parts.len() != 2 {
        return Err(AppError::Config(format!(
            "Invalid resolution format: '{text}'. Expected WxH."
        )));
    }
    let parse = |part: &str, what: &str| {
        part.trim()
            .parse::<usize>()
            .ok()
            .filter(|&value| value > 0)
            .ok_or_else(|| AppError::Config(format!("Invalid {what} in resolution: '{text}'")))
    };
    Ok(Resolution {
        width: parse(parts[0], "width")?,
        height: parse(parts[1], "height")?,
    })
}

/// Run parameters for one invocation of the tool.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Directories holding the snapshot series (repeatable).
    #[arg(short = 'd', long = "snapshot-dir", value_name = "DIR", required = true, num_args = 1..)]
    pub snapshot_dirs: Vec<PathBuf>,

    /// Directory receiving the rendered frames.
    #[arg(short, long, value_name = "DIR", default_value = "plots")]
    pub output_dir: PathBuf,

    /// First snapshot index.
    #[arg(long, default_value_t = 0)]
    pub start: u32,

    /// Last snapshot index (inclusive).
    #[arg(long, default_value_t = 500)]
    pub end: u32,

    /// Stride between snapshot indices.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub step: u32,

    /// Snapshot file prefix; files are named `{prefix}_{index:03}.hdf5`.
    #[arg(long, default_value = "disc_patch_reference")]
    pub snapshot_prefix: String,

    /// Frame file prefix; frames are named `{prefix}_{index:03}.png`.
    #[arg(long, default_value = "savename")]
    pub output_prefix: String,

    /// Projection or slice images.
    #[arg(long, value_enum, default_value_t = ImageMode::Projection)]
    pub image_mode: ImageMode,

    /// Plane index for slice images (default: the middle plane).
    #[arg(long, value_name = "N")]
    pub slice_index: Option<usize>,

    /// Axis collapsed by projections and cut by slices.
    #[arg(long, value_enum, default_value_t = SpatialAxis::Y)]
    pub line_of_sight: SpatialAxis,

    /// Resample every panel to this size (e.g. "256x1536").
    #[arg(long, value_name = "WxH", value_parser = parse_resolution)]
    pub resolution: Option<Resolution>,

    /// Frame renderer.
    #[arg(long, value_enum, default_value_t = RendererKind::Plotters)]
    pub renderer: RendererKind,

    /// TOML file with render settings (canvas, fonts, panels).
    #[arg(short, long, value_name = "FILE", env = "DISC_MORPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Append per-frame field ranges to this CSV file.
    #[arg(long, value_name = "CSV_FILE")]
    pub stats_csv: Option<PathBuf>,

    /// Skip missing snapshot files instead of failing.
    #[arg(long, default_value_t = false)]
    pub skip_missing: bool,

    /// Print stage timings at the end of the run.
    #[arg(long, default_value_t = false)]
    pub profile: bool,

    /// Report progress updates every specified interval (e.g., "1s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub report_progress_interval: Option<Duration>,

    /// Global log level.
    #[arg(long, value_enum, default_value_t = GlobalLogLevel::Info)]
    pub global_log_level: GlobalLogLevel,

    /// Log level of progress reports.
    #[arg(long, value_enum, default_value_t = ProgressLogLevel::Info)]
    pub progress_log_level: ProgressLogLevel,
}

impl AppConfig {
    /// Checks constraints clap cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.start > self.end {
            return Err(AppError::Config(format!(
                "--start ({}) must not exceed --end ({})",
                self.start, self.end
            )));
        }
        if self.snapshot_prefix.is_empty() || self.output_prefix.is_empty() {
            return Err(AppError::Config("File prefixes must not be empty".into()));
        }
        Ok(())
    }

    /// Snapshot indices to process, in order.
    pub fn times(&self) -> impl Iterator<Item = u32> {
        (self.start..=self.end).step_by(self.step as usize)
    }
}

/// How a panel collapses its field in projection mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelProjection {
    /// Mean weighted by number density.
    #[default]
    Weighted,
    /// Plain column sum, e.g. for surface brightness.
    Sum,
}

/// One panel of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub field: DerivedField,
    pub colormap: ColormapKind,
    pub norm: NormSpec,
    /// Caption above the colour bar.
    pub label: String,
    /// Ignored for slice images.
    #[serde(default)]
    pub projection: PanelProjection,
}

/// Layout and styling of rendered frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Pixel width of one panel, colour bar included.
    pub panel_width: u32,
    /// Pixel height of one panel, colour bar included.
    pub panel_height: u32,
    /// Pixel height of the colour bar strip on top of each panel.
    pub colorbar_height: u32,
    pub title_font_size: u32,
    pub label_font_size: u32,
    pub panels: Vec<PanelSpec>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            panel_width: 320,
            panel_height: 1400,
            colorbar_height: 110,
            title_font_size: 32,
            label_font_size: 16,
            panels: default_panels(),
        }
    }
}

fn default_panels() -> Vec<PanelSpec> {
    vec![
        PanelSpec {
            field: DerivedField::Temperature,
            colormap: ColormapKind::Hot,
            norm: NormSpec::Log {
                vmin: 1.0e2,
                vmax: 1.0e7,
            },
            label: "Temp (K)".into(),
            projection: PanelProjection::Weighted,
        },
        PanelSpec {
            field: DerivedField::NeutralHydrogen,
            colormap: ColormapKind::Inferno,
            norm: NormSpec::Log {
                vmin: 1.0e-10,
                vmax: 1.0,
            },
            label: "n_H0 (cm^-3)".into(),
            projection: PanelProjection::Weighted,
        },
        PanelSpec {
            field: DerivedField::IonizedHydrogen,
            colormap: ColormapKind::Bone,
            norm: NormSpec::Log {
                vmin: 1.0e-7,
                vmax: 1.0e-3,
            },
            label: "n_H+ (cm^-3)".into(),
            projection: PanelProjection::Weighted,
        },
        PanelSpec {
            field: DerivedField::VelocityZ,
            colormap: ColormapKind::TwilightShifted,
            norm: NormSpec::Symmetric { scale: 1.1 },
            label: "v_z (km s^-1)".into(),
            projection: PanelProjection::Weighted,
        },
    ]
}

impl RenderSettings {
    /// Layers built-in defaults, an optional TOML file and `DISC_MORPH_*`
    /// environment variables, in that order.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Render settings file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        let settings: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.panels.is_empty() {
            return Err(AppError::Config("At least one panel is required".into()));
        }
        if self.panel_width == 0 || self.panel_height <= self.colorbar_height {
            return Err(AppError::Config(format!(
                "Panel of {}x{} px leaves no room below a {} px colour bar",
                self.panel_width, self.panel_height, self.colorbar_height
            )));
        }
        for panel in &self.panels {
            if let NormSpec::Log { vmin, vmax } = panel.norm {
                if vmin <= 0.0 || vmax <= vmin {
                    return Err(AppError::Config(format!(
                        "Log norm of panel '{}' needs 0 < vmin < vmax",
                        panel.label
                    )));
                }
            }
        }
        Ok(())
    }
}
