//! Progress reporting for fan-out execution

use colored::Colorize;
use fanout_application::ProgressNotifier;
use fanout_domain::{CategorizedError, Phase, Target};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Reports progress during a run with progress bars on stderr
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_display_name(phase: &Phase) -> &'static str {
        match phase {
            Phase::Fanout => "Fan-out",
            Phase::Synthesis => "Synthesis",
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = guard.as_ref() {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(Self::phase_display_name(phase).to_string());
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_millis(120));

        *self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_attempt_failed(
        &self,
        target: &Target,
        attempt: u32,
        error: &CategorizedError,
        retry_in: Option<Duration>,
    ) {
        let line = attempt_failure_line(target, attempt, error, retry_in);
        self.with_bar(|pb| pb.println(line));
    }

    fn on_target_complete(&self, _phase: &Phase, target: &Target, success: bool) {
        self.with_bar(|pb| {
            let status = if success {
                format!("{} {}", "v".green(), target)
            } else {
                format!("{} {}", "x".red(), target)
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_phase_complete(&self, phase: &Phase) {
        let bar = self
            .phase_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pb) = bar {
            let phase_name = Self::phase_display_name(phase);
            pb.finish_with_message(format!("{} complete!", phase_name.green()));
        }
    }
}

/// Simple text-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        let phase_name = ProgressReporter::phase_display_name(phase);
        eprintln!(
            "{} {} ({} targets)",
            "->".cyan(),
            phase_name.bold(),
            total_tasks
        );
    }

    fn on_attempt_failed(
        &self,
        target: &Target,
        attempt: u32,
        error: &CategorizedError,
        retry_in: Option<Duration>,
    ) {
        eprintln!("{}", attempt_failure_line(target, attempt, error, retry_in));
    }

    fn on_target_complete(&self, _phase: &Phase, target: &Target, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), target);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), target);
        }
    }

    fn on_phase_complete(&self, _phase: &Phase) {
        eprintln!();
    }
}

fn attempt_failure_line(
    target: &Target,
    attempt: u32,
    error: &CategorizedError,
    retry_in: Option<Duration>,
) -> String {
    match retry_in {
        Some(delay) => format!(
            "  {} {} attempt {} failed ({}), retrying in {:.1}s",
            "!".yellow(),
            target,
            attempt,
            error,
            delay.as_secs_f64()
        ),
        None => format!(
            "  {} {} gave up after attempt {} ({})",
            "x".red(),
            target,
            attempt,
            error
        ),
    }
}
