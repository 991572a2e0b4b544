//! Stage timing for the rendering pipeline.
//!
//! Each frame passes through load, assemble, derive, image and render; the
//! profiler records how long every stage takes so slow ones stand out.

use colored::Colorize;
use std::time::{Duration, Instant};

/// Accumulated timings of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: &'static str,
    pub calls: u32,
    pub total: Duration,
    pub max: Duration,
}

impl StageTiming {
    pub fn average(&self) -> Duration {
        self.total.checked_div(self.calls).unwrap_or_default()
    }
}

/// Collects per-stage timings in the order stages first run.
#[derive(Debug, Clone)]
pub struct Profiler {
    name: String,
    stages: Vec<StageTiming>,
}

impl Profiler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stages: Vec::new(),
        }
    }

    /// Times `f` as `stage` and returns its result.
    pub fn time<T>(&mut self, stage: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.record(stage, start.elapsed());
        result
    }

    fn record(&mut self, stage: &'static str, elapsed: Duration) {
        match self.stages.iter_mut().find(|timing| timing.stage == stage) {
            Some(timing) => {
                timing.calls += 1;
                timing.total += elapsed;
                timing.max = timing.max.max(elapsed);
            }
            None => self.stages.push(StageTiming {
                stage,
                calls: 1,
                total: elapsed,
                max: elapsed,
            }),
        }
    }

    pub fn stages(&self) -> &[StageTiming] {
        &self.stages
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Formats a duration with a unit suited to its magnitude.
pub fn format_duration(duration: Duration) -> String {
    if duration.as_secs() > 0 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if duration.as_millis() > 0 {
        format!("{:.2}ms", duration.as_secs_f64() * 1e3)
    } else if duration.as_micros() > 0 {
        format!("{:.2}us", duration.as_secs_f64() * 1e6)
    } else {
        format!("{}ns", duration.as_nanos())
    }
}

/// Prints one row per stage, in pipeline order.
pub fn print_profiler_summary(profiler: &Profiler) {
    if profiler.stages().is_empty() {
        println!("No stage timings collected for {}", profiler.name());
        return;
    }

    println!("{}", format!("=== {} stage timings ===", profiler.name()).bold());
    println!(
        "{:<10} | {:>6} | {:>10} | {:>10} | {:>10}",
        "Stage", "Frames", "Total", "Average", "Max"
    );
    println!("{:-<58}", "");
    for timing in profiler.stages() {
        println!(
            "{:<10} | {:>6} | {:>10} | {:>10} | {:>10}",
            timing.stage,
            timing.calls,
            format_duration(timing.total),
            format_duration(timing.average()),
            format_duration(timing.max)
        );
    }
    println!();
}
