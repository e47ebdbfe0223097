//! # framepick
//!
//! Browse a video frame by frame, mark the frames you want, and export them
//! as numbered stills or as one animated GIF.
//!
//! Decoding is delegated to the external `ffprobe` and `ffmpeg` tools, one
//! short-lived process per request. Decoded frames are kept in a bounded
//! in-memory cache backed by a per-video scratch directory.
//!
//! ## Quick Start
//!
//! ### Browse and Mark Frames
//!
//! ```no_run
//! use framepick::VideoSession;
//!
//! let mut session = VideoSession::new();
//! let metadata = session.load("input.mp4")?;
//! println!("{}x{} @ {:.2} fps", metadata.width, metadata.height, metadata.frames_per_second);
//!
//! session.jump(30);
//! session.toggle_current()?;
//! session.next_frame();
//! session.toggle_current()?;
//! println!("{:?}", session.selected_frames());
//! # Ok::<(), framepick::FramepickError>(())
//! ```
//!
//! ### Export Stills
//!
//! ```no_run
//! use framepick::{ExportOptions, VideoSession};
//!
//! let mut session = VideoSession::new();
//! session.load("input.mp4")?;
//! session.select(0)?;
//! session.select(120)?;
//!
//! let summary = session.export_selected("stills", &ExportOptions::new())?;
//! for path in &summary.paths {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), framepick::FramepickError>(())
//! ```
//!
//! ### Export a GIF
//!
//! ```no_run
//! use framepick::{ExportOptions, GifExportSpec, GifPreset, VideoSession};
//!
//! let mut session = VideoSession::new();
//! session.load("input.mp4")?;
//! for frame in 40..60 {
//!     session.select(frame)?;
//! }
//!
//! let spec = GifExportSpec::from(GifPreset::Standard).with_loop_count(3);
//! session.export_gif("clip.gif", &spec, &ExportOptions::new())?;
//! # Ok::<(), framepick::FramepickError>(())
//! ```
//!
//! ## Features
//!
//! - **Probing**: dimensions, frame rate, frame count, and duration from
//!   `ffprobe` JSON, with fallbacks for missing fields
//! - **Single-frame decoding**: any frame by index, via a timestamp seek
//! - **Bounded cache**: at most `cache_size` decoded frames in memory;
//!   eviction drops the lowest frame index
//! - **Selection**: an ordered set of marked frames, always exported in
//!   ascending order
//! - **Still export**: `frame_NNNNNN.png` per selected frame, skipping frames
//!   that fail to decode
//! - **GIF export**: resize, RGBA normalization, fixed frame delay, and
//!   configurable looping
//! - **Progress & cancellation**: cooperative callbacks and
//!   `CancellationToken` for batch exports
//! - **Pluggable decoding**: [`FrameDecoder`] lets sessions run against any
//!   backend
//!
//! ## Requirements
//!
//! `ffmpeg` and `ffprobe` must be installed. They are looked up in an
//! `ffmpeg/` directory next to the running executable, then next to the
//! executable itself, then on `PATH`.

pub mod cache;
pub mod config;
pub mod decoder;
pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod gif;
pub mod metadata;
pub mod probe;
pub mod progress;
pub mod scratch;
pub mod selection;
pub mod session;
pub mod utilities;

pub use cache::{CacheStatistics, CachedFrame, DEFAULT_CACHE_SIZE, FrameCache};
pub use config::{ExportOptions, SessionOptions};
pub use decoder::FrameDecoder;
pub use error::FramepickError;
pub use export::{GifExportSummary, StillExportSummary};
pub use ffmpeg::{FfmpegDecoder, FfmpegLogLevel, resolve_executable};
pub use metadata::VideoMetadata;
pub use probe::{MediaProbe, parse_probe_output};
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use scratch::ScratchDirectory;
pub use selection::FrameSelection;
pub use session::VideoSession;
pub use self::gif::{GifAssembler, GifExportSpec, GifPreset, GifSummary};
