//! Runs the snapshot-to-frame pipeline over every requested timestep.

use crate::{
    config::{AppConfig, ImageMode, PanelProjection, RenderSettings, RendererKind},
    error::AppError,
    output::{self, StatsRecord, StatsWriter},
    profiler::{print_profiler_summary, Profiler},
    progress::{LogProgressReporter, ProgressInfo, ProgressReporter},
    visualization::{Extent, Frame, FrameRenderer, Panel, PlottersRenderer, TerminalRenderer},
};
use colored::Colorize;
use morph_core::projection::{project_sum, project_weighted, slice};
use morph_core::{DerivedGrids, Image2D, ScalarGrid, SpatialAxis};
use morph_snapshot::{load_from_file, snapshot_file_name};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Columns of the character preview printed by the terminal renderer.
const TERMINAL_PREVIEW_WIDTH: usize = 32;

/// One timestep of one snapshot series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameJob {
    /// Name of the series, used in the statistics file.
    pub series: String,
    pub snapshot: PathBuf,
    pub output: PathBuf,
    pub time: u32,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rendered: usize,
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Lists every frame of the run, series by series.
pub fn plan_jobs(config: &AppConfig) -> Vec<FrameJob> {
    let several_series = config.snapshot_dirs.len() > 1;
    config
        .snapshot_dirs
        .iter()
        .flat_map(|dir| {
            let output_dir = output::frame_output_dir(&config.output_dir, dir, several_series);
            let series = dir
                .file_name()
                .map_or_else(|| dir.display().to_string(), |n| n.to_string_lossy().into_owned());
            config.times().map(move |time| FrameJob {
                series: series.clone(),
                snapshot: dir.join(snapshot_file_name(&config.snapshot_prefix, time)),
                output: output_dir.join(output::frame_file_name(&config.output_prefix, time)),
                time,
            })
        })
        .collect()
}

fn build_renderer(
    config: &AppConfig,
    settings: &RenderSettings,
) -> Result<Box<dyn FrameRenderer>, AppError> {
    Ok(match config.renderer {
        RendererKind::Plotters => Box::new(PlottersRenderer::new(settings.clone())?),
        RendererKind::Terminal => Box::new(TerminalRenderer::new(TERMINAL_PREVIEW_WIDTH)),
    })
}

/// Runs the whole pipeline.
///
/// Stops at the first failing frame; with `--skip-missing` absent snapshot
/// files are logged and skipped instead.
pub fn run(config: &AppConfig, settings: &RenderSettings) -> Result<RunSummary, AppError> {
    config.validate()?;
    settings.validate()?;

    let mut renderer = build_renderer(config, settings)?;
    let mut reporter =
        LogProgressReporter::new(config.report_progress_interval, config.progress_log_level);
    let mut profiler = Profiler::new("Pipeline");

    let result = run_jobs(
        config,
        settings,
        renderer.as_mut(),
        &mut reporter,
        &mut profiler,
    );
    if let Err(e) = &result {
        if let Err(report_err) = reporter.fail(e) {
            log::error!("Failed to report failure: {}", report_err);
        }
    }
    if config.profile {
        print_profiler_summary(&profiler);
    }
    result
}

fn run_jobs(
    config: &AppConfig,
    settings: &RenderSettings,
    renderer: &mut dyn FrameRenderer,
    reporter: &mut dyn ProgressReporter,
    profiler: &mut Profiler,
) -> Result<RunSummary, AppError> {
    let jobs = plan_jobs(config);
    log::info!(
        "Rendering {} frames from {} series with the {} renderer",
        jobs.len(),
        config.snapshot_dirs.len(),
        renderer.name()
    );

    if renderer.writes_files() {
        let mut dirs: Vec<&Path> = jobs.iter().filter_map(|job| job.output.parent()).collect();
        dirs.dedup();
        for dir in dirs {
            output::ensure_dir(dir)?;
        }
    }
    let mut stats = config
        .stats_csv
        .as_deref()
        .map(StatsWriter::open)
        .transpose()?;

    let start = Instant::now();
    let mut info = ProgressInfo {
        frames_done: 0,
        frames_skipped: 0,
        frames_total: jobs.len(),
        elapsed: Duration::ZERO,
        current: String::new(),
    };

    for job in &jobs {
        if !job.snapshot.is_file() && config.skip_missing {
            log::warn!("Snapshot {:?} not found, skipping", job.snapshot);
            info.frames_skipped += 1;
        } else {
            let records = render_job(job, config, settings, renderer, profiler)?;
            if let Some(writer) = stats.as_mut() {
                for record in &records {
                    writer.write(record)?;
                }
            }
            info.frames_done += 1;
        }
        info.elapsed = start.elapsed();
        info.current = job.snapshot.display().to_string();
        reporter.report(&info)?;
    }

    if let Some(writer) = stats {
        writer.finish()?;
    }
    reporter.finish(&info)?;

    let summary = RunSummary {
        rendered: info.frames_done,
        skipped: info.frames_skipped,
        elapsed: start.elapsed(),
    };
    print_summary(&summary);
    Ok(summary)
}

fn render_job(
    job: &FrameJob,
    config: &AppConfig,
    settings: &RenderSettings,
    renderer: &mut dyn FrameRenderer,
    profiler: &mut Profiler,
) -> Result<Vec<StatsRecord>, AppError> {
    log::info!("Processing {:?}", job.snapshot);
    let snapshot = profiler.time("load", || load_from_file(&job.snapshot))?;
    let primary = profiler.time("assemble", || snapshot.assemble())?;
    let pixel_size = snapshot.header.pixel_size();
    let derived = profiler.time("derive", || DerivedGrids::from_primary(primary, pixel_size))?;

    let line_of_sight = config.line_of_sight;
    let panels = profiler.time("image", || -> Result<Vec<Panel>, AppError> {
        settings
            .panels
            .iter()
            .map(|spec| -> Result<Panel, AppError> {
                let field = derived.field(spec.field);
                let mut image =
                    panel_image(field, spec.projection, &derived, config, line_of_sight)?;
                if let Some(resolution) = config.resolution {
                    image = image.resample(resolution.width, resolution.height);
                }
                Ok(Panel {
                    field: spec.field,
                    label: spec.label.clone(),
                    colormap: spec.colormap,
                    norm: spec.norm.resolve(&image),
                    image,
                })
            })
            .collect()
    })?;

    let records: Vec<StatsRecord> = panels
        .iter()
        .map(|panel| {
            let range = panel.image.finite_range();
            match range {
                Some((min, max)) => log::info!(
                    "t={} {}: min {:.4e}, max {:.4e}",
                    job.time,
                    panel.field,
                    min,
                    max
                ),
                None => log::warn!("t={} {}: no finite values", job.time, panel.field),
            }
            StatsRecord {
                series: job.series.clone(),
                time: job.time,
                field: panel.field.name(),
                width: panel.image.width(),
                height: panel.image.height(),
                min: range.map(|(min, _)| min),
                max: range.map(|(_, max)| max),
            }
        })
        .collect();

    let frame = Frame {
        time: job.time,
        extent: Extent::centred(snapshot.header.box_size_kpc(), line_of_sight),
        panels,
    };
    profiler.time("render", || renderer.render(&frame, &job.output))?;
    Ok(records)
}

fn panel_image(
    field: &ScalarGrid,
    projection: PanelProjection,
    derived: &DerivedGrids,
    config: &AppConfig,
    line_of_sight: SpatialAxis,
) -> Result<Image2D, AppError> {
    let image = match (config.image_mode, projection) {
        (ImageMode::Projection, PanelProjection::Weighted) => {
            project_weighted(field, &derived.number_density, line_of_sight)?
        }
        (ImageMode::Projection, PanelProjection::Sum) => project_sum(field, line_of_sight),
        (ImageMode::Slice, _) => {
            let index = config
                .slice_index
                .unwrap_or_else(|| field.shape().extent(line_of_sight) / 2);
            slice(field, line_of_sight, index)?
        }
    };
    Ok(image)
}

fn print_summary(summary: &RunSummary) {
    let skipped = if summary.skipped > 0 {
        format!("{} skipped", summary.skipped).yellow()
    } else {
        "0 skipped".normal()
    };
    println!(
        "{} {} frames rendered, {} in {:.2?}",
        "Done:".green().bold(),
        summary.rendered,
        skipped,
        summary.elapsed
    );
}
