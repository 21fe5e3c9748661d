//! Progress Display

use indicatif::{ProgressBar, ProgressStyle};
use travbench_core::{QueryProgress, RunHooks, RunPhase};

/// Progress bar over every query execution of a run, warm-up included
pub struct ProgressHooks {
    bar: ProgressBar,
}

impl ProgressHooks {
    /// Bar for `total` executions
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    /// Hidden bar, for non-interactive use
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl RunHooks for ProgressHooks {
    fn on_start(&mut self) {
        self.bar.println("Warm-up complete, measuring");
    }

    fn on_stop(&mut self) {
        self.bar.finish_with_message("Complete");
    }

    fn on_query_complete(&mut self, progress: &QueryProgress<'_>) {
        let record = progress.record;
        let tag = match progress.phase {
            RunPhase::WarmingUp => "warm-up",
            _ => "run",
        };
        let status = if record.has_error() { " (failed)" } else { "" };
        self.bar.set_message(format!(
            "{} {}/{} {}#{}{}",
            tag,
            progress.iteration + 1,
            progress.iterations,
            record.name,
            record.id,
            status
        ));
        self.bar.inc(1);
    }
}
