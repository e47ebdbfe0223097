//! Animated GIF assembly.
//!
//! [`GifAssembler`] turns an ordered sequence of still frames into one
//! animated GIF according to a [`GifExportSpec`]:
//!
//! 1. frames are scaled to `target_width` (when set), preserving aspect
//!    ratio with a Lanczos filter;
//! 2. every frame is normalized to 8-bit RGBA so all frames share one
//!    rendering model;
//! 3. every frame is shown for `round(1000 / target_fps)` milliseconds;
//! 4. frames are written in input order with the configured loop count,
//!    each quantized to its own minimal palette.
//!
//! # Example
//!
//! ```no_run
//! use framepick::{GifAssembler, GifExportSpec};
//!
//! let frames = vec![image::open("a.png")?, image::open("b.png")?];
//! let spec = GifExportSpec::new().with_fps(12).with_width(320).with_loop_count(0);
//! let summary = GifAssembler::new(spec)?.assemble(&frames, "out.gif")?;
//! println!("{} frames, {} bytes", summary.frame_count, summary.file_size);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use gif::{Encoder, Frame, Repeat};
use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::error::FramepickError;
use crate::utilities::{frame_duration_millis, scaled_height};

/// Lowest accepted output frame rate.
pub const MIN_GIF_FPS: u32 = 1;
/// Highest accepted output frame rate.
pub const MAX_GIF_FPS: u32 = 30;

/// NeuQuant sampling speed handed to the `gif` crate (1 = best, 30 = fastest).
const QUANTIZER_SPEED: i32 = 10;

/// Named size/rate combinations for common destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GifPreset {
    /// 240 px wide at 10 fps, sized for chat messengers.
    Messenger,
    /// 200 px wide at 8 fps, for small stickers.
    Compact,
    /// 320 px wide at 12 fps.
    Standard,
}

impl GifPreset {
    /// Output width in pixels.
    pub fn width(self) -> u32 {
        match self {
            GifPreset::Messenger => 240,
            GifPreset::Compact => 200,
            GifPreset::Standard => 320,
        }
    }

    /// Output frame rate.
    pub fn fps(self) -> u32 {
        match self {
            GifPreset::Messenger => 10,
            GifPreset::Compact => 8,
            GifPreset::Standard => 12,
        }
    }
}

impl FromStr for GifPreset {
    type Err = FramepickError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "messenger" | "chat" => Ok(GifPreset::Messenger),
            "compact" | "sticker" => Ok(GifPreset::Compact),
            "standard" | "general" => Ok(GifPreset::Standard),
            other => Err(FramepickError::InvalidGifOptions(format!(
                "unknown preset {other:?} (expected messenger, compact, or standard)"
            ))),
        }
    }
}

/// Parameters of an animated GIF export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifExportSpec {
    /// Display rate of the output, 1–30 frames per second.
    pub target_fps: u32,
    /// Output width. Height follows as
    /// `round(source_height * target_width / source_width)`. `None` keeps
    /// the source size.
    pub target_width: Option<u32>,
    /// `0` repeats forever, otherwise the number of repeats.
    pub loop_count: u16,
}

impl Default for GifExportSpec {
    fn default() -> Self {
        Self {
            target_fps: 10,
            target_width: Some(240),
            loop_count: 0,
        }
    }
}

impl From<GifPreset> for GifExportSpec {
    fn from(preset: GifPreset) -> Self {
        Self::default()
            .with_fps(preset.fps())
            .with_width(preset.width())
    }
}

impl GifExportSpec {
    /// 10 fps, 240 px wide, looping forever.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output frame rate.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Scale frames to `width` pixels wide.
    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.target_width = Some(width);
        self
    }

    /// Keep the source frame size.
    #[must_use]
    pub fn with_source_size(mut self) -> Self {
        self.target_width = None;
        self
    }

    /// Set the loop count (`0` = forever).
    #[must_use]
    pub fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// [`FramepickError::InvalidGifOptions`] if `target_fps` is outside
    /// 1–30 or `target_width` is zero.
    pub fn validate(&self) -> Result<(), FramepickError> {
        if !(MIN_GIF_FPS..=MAX_GIF_FPS).contains(&self.target_fps) {
            return Err(FramepickError::InvalidGifOptions(format!(
                "target fps must be between {MIN_GIF_FPS} and {MAX_GIF_FPS}, got {}",
                self.target_fps
            )));
        }
        if self.target_width == Some(0) {
            return Err(FramepickError::InvalidGifOptions(
                "target width must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Display duration of every frame, in milliseconds.
    pub fn frame_duration_millis(&self) -> u32 {
        frame_duration_millis(self.target_fps)
    }

    /// Display duration in the GIF's native unit (hundredths of a second).
    pub fn frame_delay_centiseconds(&self) -> u16 {
        (self.frame_duration_millis() as f64 / 10.0).round() as u16
    }

    /// Output size for a source frame of `width` × `height`.
    pub fn output_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        match self.target_width {
            Some(target) if target != width => (target, scaled_height(width, height, target)),
            _ => (width, height),
        }
    }

    fn repeat(&self) -> Repeat {
        match self.loop_count {
            0 => Repeat::Infinite,
            count => Repeat::Finite(count),
        }
    }
}

/// Result of a successful assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifSummary {
    /// Frames written.
    pub frame_count: usize,
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Display duration of each frame in milliseconds.
    pub frame_duration_millis: u32,
    /// Size of the written file in bytes (`0` for in-memory output).
    pub file_size: u64,
}

/// Builds animated GIFs from ordered still frames.
#[derive(Debug, Clone)]
pub struct GifAssembler {
    spec: GifExportSpec,
}

impl GifAssembler {
    /// Create an assembler for a validated spec.
    ///
    /// # Errors
    ///
    /// See [`GifExportSpec::validate`].
    pub fn new(spec: GifExportSpec) -> Result<Self, FramepickError> {
        spec.validate()?;
        Ok(Self { spec })
    }

    /// The export parameters.
    pub fn spec(&self) -> &GifExportSpec {
        &self.spec
    }

    /// Write `frames`, in order, as one GIF file at `output`.
    ///
    /// Inputs are not modified.
    ///
    /// # Errors
    ///
    /// [`FramepickError::GifAssemblyFailure`] if `frames` is empty, the
    /// encoder fails, or no file exists at `output` afterwards.
    pub fn assemble<P: AsRef<Path>>(
        &self,
        frames: &[DynamicImage],
        output: P,
    ) -> Result<GifSummary, FramepickError> {
        let output = output.as_ref();
        let prepared = self.prepare(frames)?;
        let (width, height) = prepared.dimensions;
        log::debug!(
            "Encoding {} frames to GIF file {} ({width}x{height}, {} ms/frame, loop={})",
            prepared.frames.len(),
            output.display(),
            self.spec.frame_duration_millis(),
            self.spec.loop_count,
        );

        let frame_count = prepared.frames.len();
        write_or_discard(output, |writer| self.encode(prepared, writer))?;

        let file_size = fs::metadata(output)
            .map(|metadata| metadata.len())
            .map_err(|_| {
                FramepickError::GifAssemblyFailure(format!(
                    "output file {} is missing after write",
                    output.display()
                ))
            })?;

        Ok(GifSummary {
            frame_count,
            width,
            height,
            frame_duration_millis: self.spec.frame_duration_millis(),
            file_size,
        })
    }

    /// Load still images from `paths` and [`assemble`](GifAssembler::assemble)
    /// them in the given order.
    ///
    /// # Errors
    ///
    /// [`FramepickError::GifAssemblyFailure`] if any input cannot be read,
    /// plus everything [`assemble`](GifAssembler::assemble) reports.
    pub fn assemble_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        paths: &[P],
        output: Q,
    ) -> Result<GifSummary, FramepickError> {
        let frames = paths
            .iter()
            .map(|path| {
                image::open(path.as_ref()).map_err(|error| {
                    FramepickError::GifAssemblyFailure(format!(
                        "failed to read {}: {error}",
                        path.as_ref().display()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.assemble(&frames, output)
    }

    /// Encode `frames` into an in-memory GIF.
    ///
    /// # Errors
    ///
    /// [`FramepickError::GifAssemblyFailure`] if `frames` is empty or the
    /// encoder fails.
    pub fn assemble_to_memory(&self, frames: &[DynamicImage]) -> Result<Vec<u8>, FramepickError> {
        let prepared = self.prepare(frames)?;
        let mut buffer = Vec::new();
        self.encode(prepared, &mut buffer)?;
        Ok(buffer)
    }

    fn prepare(&self, frames: &[DynamicImage]) -> Result<PreparedFrames, FramepickError> {
        let first = frames.first().ok_or_else(|| {
            FramepickError::GifAssemblyFailure("no frames to assemble".to_string())
        })?;
        let (width, height) = self.spec.output_dimensions(first.width(), first.height());
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(FramepickError::GifAssemblyFailure(format!(
                "{width}x{height} exceeds the GIF size limit"
            )));
        }

        let frames = frames
            .iter()
            .map(|frame| {
                let (frame_width, frame_height) =
                    self.spec.output_dimensions(frame.width(), frame.height());
                let scaled = if (frame_width, frame_height) == (frame.width(), frame.height()) {
                    frame.to_rgba8()
                } else {
                    frame
                        .resize_exact(frame_width, frame_height, FilterType::Lanczos3)
                        .to_rgba8()
                };
                // Frames from another source size are fitted onto the first frame's canvas.
                if scaled.dimensions() == (width, height) {
                    scaled
                } else {
                    image::imageops::resize(&scaled, width, height, FilterType::Lanczos3)
                }
            })
            .collect();

        Ok(PreparedFrames {
            frames,
            dimensions: (width, height),
        })
    }

    fn encode<W: Write>(&self, prepared: PreparedFrames, writer: W) -> Result<(), FramepickError> {
        let (width, height) = prepared.dimensions;
        let (width, height) = (width as u16, height as u16);

        let mut encoder = Encoder::new(writer, width, height, &[]).map_err(|error| {
            FramepickError::GifAssemblyFailure(format!("failed to create GIF encoder: {error}"))
        })?;
        encoder.set_repeat(self.spec.repeat()).map_err(|error| {
            FramepickError::GifAssemblyFailure(format!("failed to set GIF repeat: {error}"))
        })?;

        let delay = self.spec.frame_delay_centiseconds();
        for image in prepared.frames {
            let mut pixels = image.into_raw();
            let mut frame = Frame::from_rgba_speed(width, height, &mut pixels, QUANTIZER_SPEED);
            frame.delay = delay;
            encoder.write_frame(&frame).map_err(|error| {
                FramepickError::GifAssemblyFailure(format!("failed to write GIF frame: {error}"))
            })?;
        }

        let mut writer = encoder.into_inner().map_err(|error| {
            FramepickError::GifAssemblyFailure(format!("failed to finish GIF: {error}"))
        })?;
        writer.flush().map_err(|error| {
            FramepickError::GifAssemblyFailure(format!("failed to flush GIF: {error}"))
        })?;
        Ok(())
    }
}

/// Create `output` and hand it to `write`. A file left behind by a failed
/// write is removed.
fn write_or_discard<F>(output: &Path, write: F) -> Result<(), FramepickError>
where
    F: FnOnce(BufWriter<File>) -> Result<(), FramepickError>,
{
    let file = File::create(output).map_err(|error| {
        FramepickError::GifAssemblyFailure(format!(
            "failed to create {}: {error}",
            output.display()
        ))
    })?;
    write(BufWriter::new(file)).inspect_err(|_| {
        if let Err(error) = fs::remove_file(output) {
            log::warn!("Failed to remove partial GIF {}: {error}", output.display());
        }
    })
}

struct PreparedFrames {
    frames: Vec<RgbaImage>,
    dimensions: (u32, u32),
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn failed_write_removes_partial_output() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let output = directory.path().join("partial.gif");

        let error = write_or_discard(&output, |mut writer| {
            writer.write_all(b"GIF89a")?;
            writer.flush()?;
            Err(FramepickError::GifAssemblyFailure("encoder failed".to_string()))
        })
        .unwrap_err();

        assert!(matches!(error, FramepickError::GifAssemblyFailure(_)));
        assert!(!output.exists());
    }

    #[test]
    fn successful_write_keeps_output() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let output = directory.path().join("complete.gif");

        write_or_discard(&output, |mut writer| {
            writer.write_all(b"GIF89a")?;
            writer.flush()?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read(&output).unwrap(), b"GIF89a");
    }
}
