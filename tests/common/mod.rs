//! Shared test helpers: an in-process decoder that needs no FFmpeg.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

use framepick::{FrameDecoder, FramepickError, VideoMetadata};
use image::{Rgb, RgbImage};

pub fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

/// A decoder that reports canned metadata and writes solid-color PNGs.
///
/// Frame `n` is filled with the gray level `n % 256`, so tests can tell
/// which frame ended up where.
pub struct FakeDecoder {
    metadata: VideoMetadata,
    frame_size: (u32, u32),
    failing_frames: HashSet<u64>,
    probe_error: RefCell<Option<String>>,
    probe_calls: Cell<usize>,
    extract_calls: Cell<usize>,
    extracted: RefCell<Vec<(u64, f64)>>,
}

impl FakeDecoder {
    pub fn new(frame_count: u64, frames_per_second: f64) -> Self {
        Self {
            metadata: VideoMetadata {
                width: 64,
                height: 48,
                frames_per_second,
                frame_count,
                duration: Duration::from_secs_f64(frame_count as f64 / frames_per_second),
            },
            frame_size: (64, 48),
            failing_frames: HashSet::new(),
            probe_error: RefCell::new(None),
            probe_calls: Cell::new(0),
            extract_calls: Cell::new(0),
            extracted: RefCell::new(Vec::new()),
        }
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.metadata.width = width;
        self.metadata.height = height;
        self.frame_size = (width, height);
        self
    }

    pub fn failing_on(mut self, frames: impl IntoIterator<Item = u64>) -> Self {
        self.failing_frames.extend(frames);
        self
    }

    pub fn failing_probe(self, reason: &str) -> Self {
        self.fail_probes(reason);
        self
    }

    /// Make every later probe fail, even after the decoder is in a session.
    pub fn fail_probes(&self, reason: &str) {
        *self.probe_error.borrow_mut() = Some(reason.to_string());
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.get()
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.get()
    }

    /// `(frame_index, frames_per_second)` for every extraction, in call order.
    pub fn extracted(&self) -> Vec<(u64, f64)> {
        self.extracted.borrow().clone()
    }
}

impl FrameDecoder for FakeDecoder {
    fn probe(&self, _video: &Path) -> Result<VideoMetadata, FramepickError> {
        self.probe_calls.set(self.probe_calls.get() + 1);
        match &*self.probe_error.borrow() {
            Some(reason) => Err(FramepickError::ProbeParseError(reason.clone())),
            None => Ok(self.metadata.clone()),
        }
    }

    fn extract_frame(
        &self,
        _video: &Path,
        frame_index: u64,
        frames_per_second: f64,
        output: &Path,
    ) -> Result<(), FramepickError> {
        self.extract_calls.set(self.extract_calls.get() + 1);
        self.extracted
            .borrow_mut()
            .push((frame_index, frames_per_second));

        if self.failing_frames.contains(&frame_index) {
            return Err(FramepickError::FrameDecodeFailure {
                frame_index,
                reason: "synthetic failure".to_string(),
            });
        }

        let (width, height) = self.frame_size;
        RgbImage::from_pixel(width, height, Rgb([shade_of(frame_index); 3])).save(output)?;
        Ok(())
    }
}

/// Gray level a [`FakeDecoder`] paints frame `frame_index` with.
pub fn shade_of(frame_index: u64) -> u8 {
    (frame_index % 256) as u8
}

/// A path that is never opened; the fake decoder ignores it.
pub fn fake_video() -> PathBuf {
    PathBuf::from("fake_video.mp4")
}
