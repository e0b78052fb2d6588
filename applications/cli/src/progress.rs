use indicatif::{ProgressBar, ProgressStyle};
use shelf_importer::{ImportProgress, ProgressMeter};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Import meter using indicatif progress bars.
///
/// - Scanning, duplicate checks and metadata hand-off: spinner
/// - Importing: progress bar (total known once extensions are chosen)
#[derive(Default)]
pub struct TerminalMeter {
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalMeter {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(TICK_CHARS)
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner:.cyan} {msg} [{bar:30.cyan/dim}] {percent}%")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars(TICK_CHARS)
}

impl ProgressMeter for TerminalMeter {
    fn show(&self, label: &str, determinate: bool) {
        let pb = if determinate {
            let pb = ProgressBar::new(0);
            pb.set_style(bar_style());
            pb
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(spinner_style());
            pb
        };
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn update(&self, progress: &ImportProgress) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = guard.as_ref() {
            if pb.length() != Some(progress.total() as u64) {
                pb.set_length(progress.total() as u64);
            }
            pb.set_position(progress.done() as u64);
            pb.set_message(progress.label());
        }
    }

    fn hide(&self) {
        self.finish_bar();
    }
}
