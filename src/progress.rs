//! Progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for monitoring an encode,
//! [`CancellationToken`] for cooperative cancellation, and [`ProgressInfo`] for
//! progress snapshots.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use frameroll::{EncodeOptions, FrameEncoder, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("{pct:.1}% complete");
//!         }
//!     }
//! }
//!
//! let options = EncodeOptions::new().with_progress(Arc::new(PrintProgress));
//! FrameEncoder::new(options).encode("shots")?;
//! # Ok::<(), frameroll::FramerollError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// A snapshot of encode progress.
///
/// Delivered to [`ProgressCallback::on_progress`] every
/// [`batch_size`](crate::EncodeOptions::with_batch_size) frames and once more
/// when the stream is finalized.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many frames have been written so far.
    pub current: u64,
    /// Total frames expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the encode started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// The image most recently written, if any.
    pub current_file: Option<PathBuf>,
}

/// Trait for receiving progress updates during an encode.
///
/// Callbacks observe but cannot halt the encode. Use [`CancellationToken`]
/// for cooperative cancellation.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals while frames are written.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to stop the encode.
/// The encoder checks the token before each frame.
///
/// # Example
///
/// ```
/// use frameroll::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones of this token observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks timing and emits callbacks at the configured cadence.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
    last_file: Option<PathBuf>,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
            last_file: None,
        }
    }

    /// Record one written frame and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, file: &Path) {
        self.current += 1;
        self.items_since_last_report += 1;
        self.last_file = Some(file.to_path_buf());

        if self.items_since_last_report >= self.batch_size {
            self.report();
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report();
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn report(&self) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current as f32 / t as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        let info = ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_file: self.last_file.clone(),
        };

        self.callback.on_progress(&info);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<ProgressInfo>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn reports_every_batch_and_on_finish() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), Some(5), 2);
        for index in 0..5 {
            tracker.advance(Path::new(&format!("{index}.png")));
        }
        tracker.finish();

        let reports = recorder.0.lock().unwrap();
        let currents: Vec<u64> = reports.iter().map(|info| info.current).collect();
        assert_eq!(currents, vec![2, 4, 5]);
        assert_eq!(reports[2].percentage, Some(100.0));
        assert_eq!(reports[2].current_file.as_deref(), Some(Path::new("4.png")));
    }

    #[test]
    fn estimate_survives_counts_past_u32() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), Some(1 << 33), 1);
        tracker.current = (1 << 32) - 1;
        tracker.advance(Path::new("a.png"));

        let reports = recorder.0.lock().unwrap();
        assert_eq!(reports[0].current, 1 << 32);
        assert!(reports[0].estimated_remaining.is_some());
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker = ProgressTracker::new(recorder.clone(), None, 0);
        tracker.advance(Path::new("a.png"));
        let reports = recorder.0.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].percentage, None);
        assert_eq!(reports[0].estimated_remaining, None);
    }
}
