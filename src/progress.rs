//! Progress reporting infrastructure

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::{
    borrow::Cow,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

/// CLI progress report of ongoing dataset loading operations
///
/// To avoid corrupted terminal output, you should not write anything to stdout
/// or stderr yourself as long as a report is being displayed. Please use logs
/// for debug messages.
#[derive(Clone, Debug, Default)]
pub struct ProgressReport {
    /// Progress bars of ongoing operations
    bars: MultiProgress,

    /// Number of operations that have not finished yet
    active: Arc<AtomicUsize>,
}
//
impl ProgressReport {
    /// Prepare to report progress on the cli
    pub fn new() -> Self {
        Self::default()
    }

    /// Report that tracks progress without displaying anything
    pub fn hidden() -> Self {
        Self {
            bars: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            active: Arc::default(),
        }
    }

    /// Number of operations whose progress bar is still shown
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Prepare to report on a new operation
    pub fn add(&self, what: impl Into<Cow<'static, str>>, work: Work) -> ProgressTracker {
        // Without a known total, there is no bar to fill, only a spinner
        let (bar, style) = match work {
            Work::Files(files) => (
                ProgressBar::new(files as u64),
                "{prefix} {wide_bar} {pos}/{len} files",
            ),
            Work::Bytes(Some(bytes)) => (
                ProgressBar::new(bytes),
                "{prefix} {wide_bar} {decimal_bytes}/{decimal_total_bytes} ({decimal_bytes_per_sec})",
            ),
            Work::Bytes(None) => (
                ProgressBar::new_spinner(),
                "{prefix} {spinner} {decimal_bytes} ({decimal_bytes_per_sec})",
            ),
        };
        let bar = bar.with_prefix(what).with_style(
            ProgressStyle::with_template(style)
                .expect("all styles above should be valid indicatif styles"),
        );
        self.active.fetch_add(1, Ordering::AcqRel);
        ProgressTracker {
            bar: self.bars.add(bar),
            report: self.clone(),
            finished: Arc::default(),
        }
    }
}

/// Work whose progression can be tracked
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Work {
    /// Archive entries to be parsed
    Files(usize),

    /// Bytes to be downloaded, if the total is known in advance
    Bytes(Option<u64>),
}

/// Mechanism to track progress of one operation
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    /// Progress bar for this specific operation
    bar: ProgressBar,

    /// Underlying process report
    report: ProgressReport,

    /// Truth that the bar has been removed, shared by clones of the tracker
    finished: Arc<AtomicBool>,
}
//
impl ProgressTracker {
    /// Show that a certain amount of progress has been made
    pub fn make_progress(&self, progress: u64) {
        self.bar.inc(progress);
    }

    /// Amount of progress made so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Hide the progress bar once the operation is over
    ///
    /// Only the first call has an effect.
    pub fn finish(&self) {
        if self.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        self.bar.finish_and_clear();
        self.report.bars.remove(&self.bar);
        self.report.active.fetch_sub(1, Ordering::AcqRel);
    }
}
