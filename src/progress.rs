//! Phase spinners for the command-line tool.
//!
//! In log-only mode spinners are hidden and each finished phase is logged
//! instead, so piped output stays readable.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

/// Global flag for log-only mode (set from args in main)
pub static LOG_ONLY: AtomicBool = AtomicBool::new(false);

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Create a spinner for indeterminate progress.
/// In log-only mode, the spinner is hidden.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if is_log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        let style = ProgressStyle::with_template("{msg} {spinner} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
    }
    pb.set_message(msg.to_string());
    pb
}

/// One timed step of a command (load, merge, write...).
pub struct Phase {
    label: String,
    spinner: ProgressBar,
    started: Instant,
}

impl Phase {
    pub fn start(label: &str) -> Self {
        Self {
            label: label.to_string(),
            spinner: create_spinner(label),
            started: Instant::now(),
        }
    }

    pub fn finish(self, detail: &str) {
        let line = format!(
            "{}: {} ({})",
            self.label,
            detail,
            format_duration(self.started.elapsed())
        );
        if is_log_only() {
            self.spinner.finish_and_clear();
            info!("{}", line);
        } else {
            self.spinner.finish_with_message(line);
        }
    }
}
