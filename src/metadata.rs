//! Video metadata types.
//!
//! [`VideoMetadata`] is computed once when a video is loaded (see
//! [`VideoSession::load`](crate::VideoSession::load)) and stays immutable for
//! the lifetime of that load.

use std::time::Duration;

/// Metadata for the video stream of a loaded file.
///
/// # Example
///
/// ```no_run
/// use framepick::MediaProbe;
///
/// let metadata = MediaProbe::probe("input.mp4")?;
/// println!(
///     "{}x{} @ {:.2} fps, {} frames",
///     metadata.width, metadata.height, metadata.frames_per_second, metadata.frame_count,
/// );
/// # Ok::<(), framepick::FramepickError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second, reduced from the stream's rational frame rate.
    pub frames_per_second: f64,
    /// Total number of frames. Taken from the reported stream frame count
    /// when present, otherwise `floor(duration * frames_per_second)`.
    pub frame_count: u64,
    /// Container duration.
    pub duration: Duration,
}

impl VideoMetadata {
    /// Index of the last frame, or `None` for a video with no frames.
    pub fn last_frame(&self) -> Option<u64> {
        self.frame_count.checked_sub(1)
    }

    /// Whether `frame_index` lies in `[0, frame_count)`.
    pub fn contains(&self, frame_index: u64) -> bool {
        frame_index < self.frame_count
    }

    /// Presentation time of `frame_index`, in seconds.
    pub fn timestamp_of(&self, frame_index: u64) -> f64 {
        crate::utilities::frame_index_to_seconds(frame_index, self.frames_per_second)
    }
}
