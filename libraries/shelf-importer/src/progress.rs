//! Import progress tracking

use serde::{Deserialize, Serialize};

/// Files processed out of the files expected for a folder import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportProgress {
    total: usize,
    done: usize,
}

impl ImportProgress {
    pub fn new(total: usize) -> Self {
        Self { total, done: 0 }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn done(&self) -> usize {
        self.done
    }

    /// Count one more file as handled
    pub fn advance(&mut self) {
        self.done += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }

    /// Calculate progress percentage (0-100)
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = (self.done as f32 / self.total as f32) * 100.0;
        pct.min(100.0)
    }

    /// Human-readable status, e.g. `Imported  3/12...`
    pub fn label(&self) -> String {
        let total = self.total.to_string();
        format!(
            "Imported {:>width$}/{}...",
            self.done,
            total,
            width = total.len()
        )
    }
}

/// A progress display driven by the import workflow
///
/// `show` opens the meter with a label; a determinate meter expects
/// `update` calls, an indeterminate one just spins until `hide`.
pub trait ProgressMeter: Send + Sync {
    fn show(&self, label: &str, determinate: bool);

    fn update(&self, progress: &ImportProgress);

    fn hide(&self);
}

/// Meter that displays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMeter;

impl ProgressMeter for NoopMeter {
    fn show(&self, _label: &str, _determinate: bool) {}

    fn update(&self, _progress: &ImportProgress) {}

    fn hide(&self) {}
}

/// Keeps a meter shown for as long as the guard lives
pub(crate) struct ShownMeter<'a> {
    meter: &'a dyn ProgressMeter,
}

impl<'a> ShownMeter<'a> {
    pub(crate) fn show(meter: &'a dyn ProgressMeter, label: &str, determinate: bool) -> Self {
        meter.show(label, determinate);
        Self { meter }
    }
}

impl Drop for ShownMeter<'_> {
    fn drop(&mut self) {
        self.meter.hide();
    }
}
