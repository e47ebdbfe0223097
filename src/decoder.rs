//! The decoding port.
//!
//! [`FrameDecoder`] is the narrow synchronous interface the rest of the crate
//! uses to inspect a video and pull single frames out of it. The production
//! implementation is [`FfmpegDecoder`](crate::FfmpegDecoder), which shells
//! out to the external prober and decoder; tests substitute fakes that return
//! canned metadata and images.

use std::path::Path;

use crate::{error::FramepickError, metadata::VideoMetadata};

/// A backend able to probe a video and extract single frames from it.
///
/// Every call blocks the calling thread until the backend is done. Callers
/// serialize access; implementations need no internal locking.
pub trait FrameDecoder {
    /// Read the video stream metadata of the file at `video`.
    ///
    /// # Errors
    ///
    /// [`FramepickError::DecodeUnavailable`] when the backend cannot run at
    /// all, [`FramepickError::ProbeParseError`] when no usable video stream
    /// is reported.
    fn probe(&self, video: &Path) -> Result<VideoMetadata, FramepickError>;

    /// Write frame `frame_index` of `video` as a still image to `output`.
    ///
    /// The seek position is `frame_index / frames_per_second` seconds. A
    /// returned error is a per-frame condition: the caller treats the frame
    /// as unavailable and carries on.
    fn extract_frame(
        &self,
        video: &Path,
        frame_index: u64,
        frames_per_second: f64,
        output: &Path,
    ) -> Result<(), FramepickError>;
}

impl<D: FrameDecoder + ?Sized> FrameDecoder for &D {
    fn probe(&self, video: &Path) -> Result<VideoMetadata, FramepickError> {
        (**self).probe(video)
    }

    fn extract_frame(
        &self,
        video: &Path,
        frame_index: u64,
        frames_per_second: f64,
        output: &Path,
    ) -> Result<(), FramepickError> {
        (**self).extract_frame(video, frame_index, frames_per_second, output)
    }
}
