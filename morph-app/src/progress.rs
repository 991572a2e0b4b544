// morph-app/src/progress.rs

use crate::config::ProgressLogLevel;
use crate::error::AppError;
use anyhow::Result;
use std::time::{Duration, Instant};

/// Snapshot of how far a run has got.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// Frames rendered so far.
    pub frames_done: usize,
    /// Frames skipped because their snapshot was missing.
    pub frames_skipped: usize,
    /// Frames planned for the whole run.
    pub frames_total: usize,
    pub elapsed: Duration,
    /// Snapshot file handled last.
    pub current: String,
}

impl ProgressInfo {
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.frames_total == 0 {
            return 100.0;
        }
        (self.frames_done + self.frames_skipped) as f64 / self.frames_total as f64 * 100.0
    }
}

/// Trait for reporting the progress of a rendering run.
///
/// Implementors decide how and how often progress is shown.
pub trait ProgressReporter: Send {
    /// Called after every frame, rendered or skipped.
    fn report(&mut self, info: &ProgressInfo) -> Result<()>;

    /// Called once when the run completes successfully.
    fn finish(&mut self, info: &ProgressInfo) -> Result<()>;

    /// Called when the run stops on an error.
    fn fail(&mut self, error: &AppError) -> Result<()>;
}

/// Reports through the `log` facade, at most once per `interval`.
///
/// Without an interval only the final line is logged.
#[derive(Debug)]
pub struct LogProgressReporter {
    interval: Option<Duration>,
    level: ProgressLogLevel,
    last_report: Option<Instant>,
    emitted: usize,
}

impl LogProgressReporter {
    #[must_use]
    pub const fn new(interval: Option<Duration>, level: ProgressLogLevel) -> Self {
        Self {
            interval,
            level,
            last_report: None,
            emitted: 0,
        }
    }

    /// Number of progress lines logged by [`ProgressReporter::report`].
    #[must_use]
    pub const fn reports_emitted(&self) -> usize {
        self.emitted
    }

    fn log(&self, msg: &str) {
        match self.level {
            ProgressLogLevel::Trace => log::trace!("{}", msg),
            ProgressLogLevel::Debug => log::debug!("{}", msg),
            ProgressLogLevel::Info => log::info!("{}", msg),
            ProgressLogLevel::Warn => log::warn!("{}", msg),
        }
    }
}

impl ProgressReporter for LogProgressReporter {
    fn report(&mut self, info: &ProgressInfo) -> Result<()> {
        let Some(interval) = self.interval else {
            return Ok(());
        };
        let now = Instant::now();
        let due = self
            .last_report
            .map_or(true, |last| now.duration_since(last) >= interval);
        if !due {
            return Ok(());
        }
        self.last_report = Some(now);
        self.emitted += 1;

        let elapsed_secs = info.elapsed.as_secs_f64();
        let rate = if elapsed_secs > 0.0 {
            info.frames_done as f64 / elapsed_secs
        } else {
            0.0
        };
        self.log(&format!(
            "Progress: {}/{} frames ({:.1}%), {} skipped, Elapsed: {:.2?}, Rate: {:.2} frames/s, Last: {}",
            info.frames_done + info.frames_skipped,
            info.frames_total,
            info.percentage(),
            info.frames_skipped,
            info.elapsed,
            rate,
            info.current
        ));
        Ok(())
    }

    fn finish(&mut self, info: &ProgressInfo) -> Result<()> {
        self.log(&format!(
            "Finished: {} frames rendered, {} skipped in {:.2?}",
            info.frames_done, info.frames_skipped, info.elapsed
        ));
        Ok(())
    }

    fn fail(&mut self, error: &AppError) -> Result<()> {
        log::error!("Run aborted: {}", error);
        Ok(())
    }
}
