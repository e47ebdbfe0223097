//! Session and export configuration.
//!
//! [`SessionOptions`] configures a [`VideoSession`](crate::VideoSession)
//! (cache size, decoder executables, decoder verbosity). [`ExportOptions`]
//! threads progress callbacks and cancellation through batch exports without
//! widening every signature.
//!
//! # Example
//!
//! ```no_run
//! use framepick::{CancellationToken, ExportOptions, FfmpegLogLevel, SessionOptions};
//!
//! let session_options = SessionOptions::new()
//!     .with_cache_size(120)
//!     .with_log_level(FfmpegLogLevel::Quiet);
//!
//! let token = CancellationToken::new();
//! let export_options = ExportOptions::new()
//!     .with_cancellation(token.clone())
//!     .with_batch_size(5);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    cache::DEFAULT_CACHE_SIZE,
    ffmpeg::{FFMPEG, FFPROBE, FfmpegDecoder, FfmpegLogLevel, resolve_executable},
    progress::{CancellationToken, NoOpProgress, ProgressCallback},
};

/// Settings for a [`VideoSession`](crate::VideoSession).
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Maximum number of decoded frames kept in memory.
    pub cache_size: usize,
    /// Decoder executable. `None` resolves `ffmpeg` at session creation.
    pub ffmpeg_path: Option<PathBuf>,
    /// Prober executable. `None` resolves `ffprobe` at session creation.
    pub ffprobe_path: Option<PathBuf>,
    /// Console verbosity passed to both tools.
    pub log_level: FfmpegLogLevel,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionOptions {
    /// Defaults: 50 cached frames, tools resolved automatically, `error`
    /// verbosity.
    pub fn new() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            ffmpeg_path: None,
            ffprobe_path: None,
            log_level: FfmpegLogLevel::default(),
        }
    }

    /// Set the cache capacity. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_cache_size(mut self, frames: usize) -> Self {
        self.cache_size = frames.max(1);
        self
    }

    /// Use an explicit decoder executable.
    #[must_use]
    pub fn with_ffmpeg(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = Some(path.into());
        self
    }

    /// Use an explicit prober executable.
    #[must_use]
    pub fn with_ffprobe(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = Some(path.into());
        self
    }

    /// Set the FFmpeg console verbosity.
    #[must_use]
    pub fn with_log_level(mut self, level: FfmpegLogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Build the subprocess decoder these options describe.
    pub fn decoder(&self) -> FfmpegDecoder {
        let ffmpeg = self
            .ffmpeg_path
            .clone()
            .unwrap_or_else(|| resolve_executable(FFMPEG));
        let ffprobe = self
            .ffprobe_path
            .clone()
            .unwrap_or_else(|| resolve_executable(FFPROBE));
        FfmpegDecoder::with_paths(ffmpeg, ffprobe).with_log_level(self.log_level)
    }
}

/// Settings for batch exports.
///
/// A default-constructed value reports nothing and is never cancelled.
#[derive(Clone)]
pub struct ExportOptions {
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) batch_size: u64,
}

impl Debug for ExportOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExportOptions")
            .field("has_progress", &true)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportOptions {
    /// No progress callback, no cancellation, batch size 1.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token, checked before each frame.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Report every `size` frames. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
