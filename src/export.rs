//! Still-image and GIF export from a [`VideoSession`].
//!
//! Every batch export walks the selection in ascending frame order, reads
//! each frame through the session's cache, and skips frames that fail to
//! decode. Summaries report what was actually written, not what was asked
//! for. An empty selection is rejected before anything touches the
//! filesystem.
//!
//! # Example
//!
//! ```no_run
//! use framepick::{ExportOptions, GifExportSpec, VideoSession};
//!
//! let mut session = VideoSession::new();
//! session.load("input.mp4")?;
//! for frame in [2, 0, 5] {
//!     session.select(frame)?;
//! }
//!
//! // Written as frame_000001.png, frame_000003.png, frame_000006.png.
//! let stills = session.export_selected("stills", &ExportOptions::new())?;
//! println!("wrote {} of {}", stills.written, stills.requested);
//!
//! let gif = session.export_gif("clip.gif", &GifExportSpec::new(), &ExportOptions::new())?;
//! println!("{} frames, {} bytes", gif.summary.frame_count, gif.summary.file_size);
//! # Ok::<(), framepick::FramepickError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::ExportOptions,
    decoder::FrameDecoder,
    error::FramepickError,
    gif::{GifAssembler, GifExportSpec, GifSummary},
    progress::{OperationType, ProgressTracker},
    scratch::{GIF_EXPORT_PREFIX, ScratchDirectory},
    session::VideoSession,
    utilities::still_file_name,
};

/// Outcome of [`VideoSession::export_selected`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillExportSummary {
    /// Frames that were selected.
    pub requested: usize,
    /// Frames actually written.
    pub written: usize,
    /// Frames that could not be decoded, in ascending order.
    pub skipped: Vec<u64>,
    /// Written files, in ascending frame order.
    pub paths: Vec<PathBuf>,
}

/// Outcome of [`VideoSession::export_gif`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifExportSummary {
    /// Frames that were selected.
    pub requested: usize,
    /// Frames that could not be decoded and were left out.
    pub skipped: Vec<u64>,
    /// Frames actually in the GIF, in ascending order.
    pub frames: Vec<u64>,
    /// Where the GIF was written.
    pub output: PathBuf,
    /// Details of the assembled file.
    pub summary: GifSummary,
}

impl<D: FrameDecoder> VideoSession<D> {
    /// Save frame `frame_index` to `path`. The format follows the extension.
    ///
    /// # Errors
    ///
    /// [`FramepickError::NoVideoLoaded`], [`FramepickError::FrameOutOfRange`],
    /// the decoder's error for this frame, or an image error while saving.
    pub fn export_frame<P: AsRef<Path>>(
        &mut self,
        frame_index: u64,
        path: P,
    ) -> Result<PathBuf, FramepickError> {
        let path = path.as_ref();
        let image = self.try_frame(frame_index)?;
        image.save(path)?;
        log::debug!("Saved frame {frame_index} to {}", path.display());
        Ok(path.to_path_buf())
    }

    /// Save the frame at the cursor into `directory` under its default name
    /// (see [`still_file_name`]).
    ///
    /// # Errors
    ///
    /// As for [`export_frame`](VideoSession::export_frame), plus I/O errors
    /// creating `directory`.
    pub fn export_current_frame<P: AsRef<Path>>(
        &mut self,
        directory: P,
    ) -> Result<PathBuf, FramepickError> {
        let frame_index = self.current_frame();
        let directory = directory.as_ref();
        if !self.is_loaded() {
            return Err(FramepickError::NoVideoLoaded);
        }
        fs::create_dir_all(directory)?;
        self.export_frame(frame_index, directory.join(still_file_name(frame_index)))
    }

    /// Save every selected frame into `directory` as
    /// `frame_NNNNNN.png` (1-based frame number), in ascending order.
    ///
    /// # Errors
    ///
    /// [`FramepickError::EmptySelection`] before any I/O when nothing is
    /// selected, [`FramepickError::Cancelled`] if the token fires between
    /// frames, or an I/O/image error while writing. Frames that fail to
    /// decode are skipped, not reported as errors.
    pub fn export_selected<P: AsRef<Path>>(
        &mut self,
        directory: P,
        options: &ExportOptions,
    ) -> Result<StillExportSummary, FramepickError> {
        let frames = self.selected_frames();
        if frames.is_empty() {
            return Err(FramepickError::EmptySelection);
        }
        if !self.is_loaded() {
            return Err(FramepickError::NoVideoLoaded);
        }

        let directory = directory.as_ref();
        fs::create_dir_all(directory)?;

        let mut tracker = ProgressTracker::new(
            options.progress.clone(),
            OperationType::FrameExport,
            frames.len() as u64,
            options.batch_size,
        );
        let mut summary = StillExportSummary {
            requested: frames.len(),
            written: 0,
            skipped: Vec::new(),
            paths: Vec::new(),
        };

        for frame_index in frames {
            if options.is_cancelled() {
                return Err(FramepickError::Cancelled);
            }

            match self.try_frame(frame_index) {
                Ok(image) => {
                    let path = directory.join(still_file_name(frame_index));
                    image.save(&path)?;
                    summary.written += 1;
                    summary.paths.push(path);
                    tracker.advance(frame_index, true);
                }
                Err(error) => {
                    log::warn!("Skipping frame {frame_index}: {error}");
                    summary.skipped.push(frame_index);
                    tracker.advance(frame_index, false);
                }
            }
        }

        tracker.finish();
        log::debug!(
            "Exported {} of {} selected frames to {}",
            summary.written,
            summary.requested,
            directory.display()
        );
        Ok(summary)
    }

    /// Assemble the selected frames, in ascending order, into an animated
    /// GIF at `output`.
    ///
    /// Decoded frames are staged as stills in a scratch directory of their
    /// own, which is removed afterwards whether or not assembly succeeds.
    ///
    /// # Errors
    ///
    /// [`FramepickError::EmptySelection`] or
    /// [`FramepickError::InvalidGifOptions`] before any I/O,
    /// [`FramepickError::Cancelled`] if the token fires between frames, and
    /// [`FramepickError::GifAssemblyFailure`] if no frame could be decoded or
    /// the GIF could not be written.
    pub fn export_gif<P: AsRef<Path>>(
        &mut self,
        output: P,
        spec: &GifExportSpec,
        options: &ExportOptions,
    ) -> Result<GifExportSummary, FramepickError> {
        let frames = self.selected_frames();
        if frames.is_empty() {
            return Err(FramepickError::EmptySelection);
        }
        if !self.is_loaded() {
            return Err(FramepickError::NoVideoLoaded);
        }
        let assembler = GifAssembler::new(spec.clone())?;

        let scratch = ScratchDirectory::new(GIF_EXPORT_PREFIX)?;
        let result =
            self.stage_and_assemble(&frames, &scratch, &assembler, output.as_ref(), options);
        scratch.close();
        result
    }

    fn stage_and_assemble(
        &mut self,
        frames: &[u64],
        scratch: &ScratchDirectory,
        assembler: &GifAssembler,
        output: &Path,
        options: &ExportOptions,
    ) -> Result<GifExportSummary, FramepickError> {
        let mut tracker = ProgressTracker::new(
            options.progress.clone(),
            OperationType::GifExport,
            frames.len() as u64,
            options.batch_size,
        );
        let mut staged = Vec::with_capacity(frames.len());
        let mut included = Vec::with_capacity(frames.len());
        let mut skipped = Vec::new();

        for &frame_index in frames {
            if options.is_cancelled() {
                return Err(FramepickError::Cancelled);
            }

            match self.try_frame(frame_index) {
                Ok(image) => {
                    let path = scratch.file(&format!("{:04}.png", staged.len()));
                    image.save(&path)?;
                    staged.push(path);
                    included.push(frame_index);
                    tracker.advance(frame_index, true);
                }
                Err(error) => {
                    log::warn!("Leaving frame {frame_index} out of GIF: {error}");
                    skipped.push(frame_index);
                    tracker.advance(frame_index, false);
                }
            }
        }
        tracker.finish();

        let summary = assembler.assemble_files(&staged, output)?;
        log::debug!(
            "Assembled {} frames into {} ({} bytes)",
            summary.frame_count,
            output.display(),
            summary.file_size
        );

        Ok(GifExportSummary {
            requested: frames.len(),
            skipped,
            frames: included,
            output: output.to_path_buf(),
            summary,
        })
    }
}
