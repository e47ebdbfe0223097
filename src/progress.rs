//! Progress reporting and cancellation for batch exports.
//!
//! Batch exports run on the caller's thread. Instead of handing work to a
//! background thread, they report through a [`ProgressCallback`] and check a
//! [`CancellationToken`] between frames. A frame that is already being
//! decoded always finishes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framepick::{ExportOptions, ProgressCallback, ProgressInfo, VideoSession};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% ({} skipped)", info.operation, info.skipped);
//!         }
//!     }
//! }
//!
//! let mut session = VideoSession::new();
//! session.load("input.mp4")?;
//! session.select(0)?;
//! session.select(10)?;
//!
//! let options = ExportOptions::new().with_progress(Arc::new(PrintProgress));
//! let summary = session.export_selected("frames", &options)?;
//! println!("wrote {} of {}", summary.written, summary.requested);
//! # Ok::<(), framepick::FramepickError>(())
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// The kind of batch operation in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Writing selected frames as still images.
    FrameExport,
    /// Decoding selected frames for an animated GIF.
    GifExport,
}

/// A snapshot of batch progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// Frames processed so far, including skipped ones.
    pub current: u64,
    /// Frames in the batch.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since the batch started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on throughput so far.
    pub estimated_remaining: Option<Duration>,
    /// Frame index that was just processed.
    pub current_frame: Option<u64>,
    /// Frames that failed to decode and were left out.
    pub skipped: u64,
}

/// Receives progress updates during a batch export.
///
/// Callbacks observe but cannot halt the operation; use a
/// [`CancellationToken`] for that.
pub trait ProgressCallback: Send + Sync {
    /// Called every `batch_size` frames and once more when the batch ends.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. Used when no callback is set.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation flag shared between clones.
///
/// # Example
///
/// ```
/// use framepick::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks batch timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: u64,
    current: u64,
    skipped: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: u64,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            skipped: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one processed frame, reporting when the batch threshold is hit.
    pub(crate) fn advance(&mut self, frame_index: u64, succeeded: bool) {
        self.current += 1;
        if !succeeded {
            self.skipped += 1;
        }
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(Some(frame_index));
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&mut self) {
        self.report(None);
    }

    fn report(&self, frame_index: Option<u64>) {
        let elapsed = self.start_time.elapsed();

        let percentage =
            (self.total > 0).then(|| (self.current as f32 / self.total as f32) * 100.0);

        let estimated_remaining = (self.current > 0).then(|| {
            let remaining = self.total.saturating_sub(self.current);
            elapsed.div_f64(self.current as f64).mul_f64(remaining as f64)
        });

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: Some(self.total),
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_index,
            skipped: self.skipped,
        });
    }
}
