//! The per-video session.
//!
//! [`VideoSession`] is the single owner of everything tied to one open video:
//! its metadata, the frame cache and its scratch directory, the selection,
//! and the current-frame cursor. All mutation goes through its methods.
//!
//! # Example
//!
//! ```no_run
//! use framepick::VideoSession;
//!
//! let mut session = VideoSession::new();
//! let metadata = session.load("input.mp4")?;
//! println!("{} frames", metadata.frame_count);
//!
//! session.jump(30);
//! session.toggle_current()?;
//! if let Some(image) = session.current_image() {
//!     println!("{}x{}", image.width(), image.height());
//! }
//! session.close();
//! # Ok::<(), framepick::FramepickError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
};

use image::DynamicImage;

use crate::{
    cache::FrameCache,
    config::SessionOptions,
    decoder::FrameDecoder,
    error::FramepickError,
    ffmpeg::FfmpegDecoder,
    metadata::VideoMetadata,
    selection::FrameSelection,
    utilities::frame_label,
};

struct LoadedVideo {
    path: PathBuf,
    metadata: VideoMetadata,
    cache: FrameCache,
}

/// Coordinator for one open video.
///
/// The session is single-consumer: calls that decode block the calling
/// thread for one decoder invocation, and the session does no locking of
/// its own.
pub struct VideoSession<D: FrameDecoder = FfmpegDecoder> {
    decoder: D,
    cache_size: usize,
    loaded: Option<LoadedVideo>,
    selection: FrameSelection,
    current_frame: u64,
}

impl<D: FrameDecoder> Debug for VideoSession<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSession")
            .field("path", &self.path())
            .field("metadata", &self.metadata())
            .field("cache", &self.loaded.as_ref().map(|loaded| &loaded.cache))
            .field("selection", &self.selection)
            .field("current_frame", &self.current_frame)
            .finish_non_exhaustive()
    }
}

impl Default for VideoSession<FfmpegDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSession<FfmpegDecoder> {
    /// Create an empty session using the FFmpeg tools with default options.
    pub fn new() -> Self {
        Self::with_options(&SessionOptions::new())
    }

    /// Create an empty session from [`SessionOptions`].
    pub fn with_options(options: &SessionOptions) -> Self {
        Self::with_decoder(options.decoder()).with_cache_size(options.cache_size)
    }
}

impl<D: FrameDecoder> VideoSession<D> {
    /// Create an empty session around any [`FrameDecoder`].
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            cache_size: crate::cache::DEFAULT_CACHE_SIZE,
            loaded: None,
            selection: FrameSelection::new(),
            current_frame: 0,
        }
    }

    /// Set the cache capacity used by subsequent loads. Clamped to at least 1.
    #[must_use]
    pub fn with_cache_size(mut self, frames: usize) -> Self {
        self.cache_size = frames.max(1);
        self
    }

    /// The decoding backend.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Open a video, replacing whatever was loaded before.
    ///
    /// The file is probed first. Only once probing succeeds is the previous
    /// video's state discarded: its scratch directory is purged, the cache,
    /// selection, and cursor are reset, and a fresh scratch directory is
    /// allocated.
    ///
    /// # Errors
    ///
    /// [`FramepickError::LoadError`] wrapping the probe failure; the session
    /// keeps its previous state. An I/O error if the new scratch directory
    /// cannot be created, in which case the session is left empty.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&VideoMetadata, FramepickError> {
        let path = path.as_ref();
        log::debug!("Loading video {}", path.display());

        let metadata = self
            .decoder
            .probe(path)
            .map_err(|error| FramepickError::LoadError {
                path: path.to_path_buf(),
                source: Box::new(error),
            })?;

        self.close();
        let cache = FrameCache::new(self.cache_size)?;
        let loaded = self.loaded.insert(LoadedVideo {
            path: path.to_path_buf(),
            metadata,
            cache,
        });
        Ok(&loaded.metadata)
    }

    /// Discard the loaded video and delete its scratch directory.
    ///
    /// Calling this on an empty session does nothing.
    pub fn close(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            log::debug!("Closing video {}", loaded.path.display());
            loaded.cache.close();
        }
        self.selection.clear();
        self.current_frame = 0;
    }

    /// Whether a video is loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Path of the loaded video.
    pub fn path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|loaded| loaded.path.as_path())
    }

    /// Metadata of the loaded video.
    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.loaded.as_ref().map(|loaded| &loaded.metadata)
    }

    /// The frame cache of the loaded video.
    pub fn cache(&self) -> Option<&FrameCache> {
        self.loaded.as_ref().map(|loaded| &loaded.cache)
    }

    /// Total frame count, `0` when nothing is loaded.
    pub fn total_frames(&self) -> u64 {
        self.metadata().map_or(0, |metadata| metadata.frame_count)
    }

    /// The cursor, always within `[0, total_frames - 1]` (or `0`).
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    /// Move the cursor one frame forward. Returns the new position.
    pub fn next_frame(&mut self) -> u64 {
        self.jump(1)
    }

    /// Move the cursor one frame back. Returns the new position.
    pub fn previous_frame(&mut self) -> u64 {
        self.jump(-1)
    }

    /// Move the cursor by `delta` frames, stopping at either end.
    pub fn jump(&mut self, delta: i64) -> u64 {
        let target = i128::from(self.current_frame) + i128::from(delta);
        self.move_cursor(target)
    }

    /// Place the cursor at `frame_index`, clamped to the video.
    pub fn seek(&mut self, frame_index: u64) -> u64 {
        self.move_cursor(i128::from(frame_index))
    }

    fn move_cursor(&mut self, target: i128) -> u64 {
        let last = self.total_frames().saturating_sub(1);
        self.current_frame = target.clamp(0, i128::from(last)) as u64;
        self.current_frame
    }

    /// The decoded image of `frame_index`, or `None` if it is out of range
    /// or could not be decoded.
    pub fn frame(&mut self, frame_index: u64) -> Option<Arc<DynamicImage>> {
        match self.try_frame(frame_index) {
            Ok(image) => Some(image),
            Err(error) => {
                log::warn!("Frame {frame_index} unavailable: {error}");
                None
            }
        }
    }

    /// The decoded image at the cursor.
    pub fn current_image(&mut self) -> Option<Arc<DynamicImage>> {
        self.frame(self.current_frame)
    }

    /// [`frame`](VideoSession::frame), keeping the reason for a failure.
    ///
    /// # Errors
    ///
    /// [`FramepickError::NoVideoLoaded`], [`FramepickError::FrameOutOfRange`],
    /// or the decoder's error for this frame.
    pub fn try_frame(&mut self, frame_index: u64) -> Result<Arc<DynamicImage>, FramepickError> {
        self.check_index(frame_index)?;
        let loaded = self.loaded.as_mut().ok_or(FramepickError::NoVideoLoaded)?;
        loaded.cache.try_get(
            &self.decoder,
            &loaded.path,
            loaded.metadata.frames_per_second,
            frame_index,
        )
    }

    fn check_index(&self, frame_index: u64) -> Result<(), FramepickError> {
        let metadata = self.metadata().ok_or(FramepickError::NoVideoLoaded)?;
        if metadata.contains(frame_index) {
            Ok(())
        } else {
            Err(FramepickError::FrameOutOfRange {
                frame_index,
                total_frames: metadata.frame_count,
            })
        }
    }

    /// The marked frames.
    pub fn selection(&self) -> &FrameSelection {
        &self.selection
    }

    /// Marked frames in ascending order.
    pub fn selected_frames(&self) -> Vec<u64> {
        self.selection.sorted()
    }

    /// Whether `frame_index` is marked.
    pub fn is_selected(&self, frame_index: u64) -> bool {
        self.selection.contains(frame_index)
    }

    /// Mark or unmark `frame_index`. Returns `true` if it is marked afterwards.
    ///
    /// # Errors
    ///
    /// [`FramepickError::NoVideoLoaded`] or [`FramepickError::FrameOutOfRange`].
    pub fn toggle(&mut self, frame_index: u64) -> Result<bool, FramepickError> {
        self.check_index(frame_index)?;
        Ok(self.selection.toggle(frame_index))
    }

    /// Mark or unmark the frame at the cursor.
    ///
    /// # Errors
    ///
    /// [`FramepickError::NoVideoLoaded`] on an empty session.
    pub fn toggle_current(&mut self) -> Result<bool, FramepickError> {
        self.toggle(self.current_frame)
    }

    /// Mark `frame_index`. Returns `false` if it was already marked.
    ///
    /// # Errors
    ///
    /// [`FramepickError::NoVideoLoaded`] or [`FramepickError::FrameOutOfRange`].
    pub fn select(&mut self, frame_index: u64) -> Result<bool, FramepickError> {
        self.check_index(frame_index)?;
        Ok(self.selection.add(frame_index))
    }

    /// Unmark `frame_index`. Returns `false` if it was not marked.
    pub fn deselect(&mut self, frame_index: u64) -> bool {
        self.selection.remove(frame_index)
    }

    /// Unmark everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Display label for `frame_index`, e.g. `"Frame 31 (1.20s)"`.
    pub fn frame_label(&self, frame_index: u64) -> Option<String> {
        self.metadata()
            .map(|metadata| frame_label(frame_index, metadata.frames_per_second))
    }
}
