//! Error types for the `framepick` crate.
//!
//! This module defines [`FramepickError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry the context needed to
//! tell failures apart: program names for decoder problems, frame indices for
//! per-frame failures, and paths for load failures.

use std::{io::Error as IoError, path::PathBuf};

use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framepick` operations.
///
/// Load-time failures ([`DecodeUnavailable`](FramepickError::DecodeUnavailable),
/// [`ProbeParseError`](FramepickError::ProbeParseError)) abort a load and are
/// surfaced wrapped in [`LoadError`](FramepickError::LoadError). Per-frame
/// [`FrameDecodeFailure`](FramepickError::FrameDecodeFailure)s are recoverable
/// and never abort a batch export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramepickError {
    /// The decoder or prober executable could not be started.
    #[error("Decoder unavailable: failed to run {program}: {reason}")]
    DecodeUnavailable {
        /// Program that was invoked.
        program: PathBuf,
        /// Why the process could not be run.
        reason: String,
    },

    /// The prober output was malformed or contained no video stream.
    #[error("Failed to parse probe output: {0}")]
    ProbeParseError(String),

    /// A single frame could not be extracted.
    #[error("Failed to decode frame {frame_index}: {reason}")]
    FrameDecodeFailure {
        /// Zero-based index of the frame.
        frame_index: u64,
        /// Underlying reason.
        reason: String,
    },

    /// An export was requested with no frames selected.
    #[error("No frames selected for export")]
    EmptySelection,

    /// The animated image could not be assembled or is missing afterwards.
    #[error("GIF assembly failed: {0}")]
    GifAssemblyFailure(String),

    /// Loading a video failed; the session keeps its previous state.
    #[error("Failed to load video at {path}: {source}")]
    LoadError {
        /// Path passed to [`VideoSession::load`](crate::VideoSession::load).
        path: PathBuf,
        /// The probe failure that aborted the load.
        #[source]
        source: Box<FramepickError>,
    },

    /// An operation needing an open video was called on an empty session.
    #[error("No video loaded")]
    NoVideoLoaded,

    /// The frame index is outside `[0, total_frames)`.
    #[error("Frame {frame_index} is out of range (video has {total_frames} frames)")]
    FrameOutOfRange {
        /// Requested frame index.
        frame_index: u64,
        /// Total number of frames in the loaded video.
        total_frames: u64,
    },

    /// GIF export parameters were rejected.
    #[error("Invalid GIF options: {0}")]
    InvalidGifOptions(String),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while loading or saving frames.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}
