//! Terminal progress for snapshot loading and detection.
//!
//! Bars and spinners draw on stderr so JSON on stdout stays clean. With
//! `--log-only` they are hidden and [`log_progress`] emits periodic
//! `tracing` lines instead.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

static LOG_ONLY: AtomicBool = AtomicBool::new(false);

const BAR_TEMPLATE: &str = "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})";
const SPINNER_TEMPLATE: &str = "{msg} {spinner} [{elapsed_precise}]";

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// "12.3s" under a minute, "1.5m" above.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Apply `style`, or hide the bar entirely in log-only mode.
fn styled(pb: ProgressBar, style: impl FnOnce() -> ProgressStyle, msg: &str) -> ProgressBar {
    if is_log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(style());
    }
    pb.set_message(msg.to_string());
    pb
}

/// Bar over a known number of rows.
pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    styled(
        ProgressBar::new(len),
        || {
            ProgressStyle::default_bar()
                .template(BAR_TEMPLATE)
                .unwrap()
                .progress_chars("=> ")
        },
        msg,
    )
}

/// Spinner for work with no natural unit count.
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = styled(
        ProgressBar::new_spinner(),
        || ProgressStyle::default_spinner().template(SPINNER_TEMPLATE).unwrap(),
        msg,
    );
    if !is_log_only() {
        pb.enable_steady_tick(Duration::from_millis(100));
    }
    pb
}

/// In log-only mode, report every `interval` items and at the end.
pub fn log_progress(phase: &str, current: u64, total: u64, interval: u64) {
    if is_log_only() && total > 0 && (current % interval == 0 || current == total) {
        let pct = 100.0 * current as f64 / total as f64;
        info!("[{}] {}/{} ({:.1}%)", phase, current, total, pct);
    }
}
