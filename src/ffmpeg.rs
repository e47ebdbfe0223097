//! FFmpeg subprocess backend.
//!
//! [`FfmpegDecoder`] implements [`FrameDecoder`] by invoking the `ffprobe`
//! and `ffmpeg` command-line tools. The executables are located with
//! [`resolve_executable`], and their console verbosity is controlled with
//! [`FfmpegLogLevel`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use framepick::{FfmpegDecoder, FfmpegLogLevel, FrameDecoder};
//!
//! let decoder = FfmpegDecoder::new().with_log_level(FfmpegLogLevel::Quiet);
//! let metadata = decoder.probe(Path::new("input.mp4"))?;
//! decoder.extract_frame(
//!     Path::new("input.mp4"),
//!     100,
//!     metadata.frames_per_second,
//!     Path::new("frame_100.png"),
//! )?;
//! # Ok::<(), framepick::FramepickError>(())
//! ```
//!
//! # Note
//!
//! The log level controls **FFmpeg's own stderr output** (its `-v` flag),
//! not the Rust-side diagnostics emitted via the `log` crate.

use std::{
    env,
    ffi::OsStr,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

#[cfg(windows)]
use std::os::windows::process::CommandExt;

use crate::{
    decoder::FrameDecoder,
    error::FramepickError,
    metadata::VideoMetadata,
    probe::{PROBE_ARGUMENTS, parse_probe_output},
    utilities::{frame_index_to_seconds, seek_argument},
};

/// Name of the decoder executable.
pub const FFMPEG: &str = "ffmpeg";
/// Name of the prober executable.
pub const FFPROBE: &str = "ffprobe";
/// Subdirectory next to the running program that may hold bundled tools.
pub const BUNDLED_DIRECTORY: &str = "ffmpeg";

/// Windows flag preventing child processes from opening a console window.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// FFmpeg console verbosity, passed to both tools as `-v <level>`.
///
/// # Ordering (most verbose → most quiet)
///
/// `Trace` > `Debug` > `Verbose` > `Info` > `Warning` > `Error` > `Fatal` > `Panic` > `Quiet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FfmpegLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only log conditions after which the process aborts.
    Panic,
    /// Only log unrecoverable errors.
    Fatal,
    /// Log recoverable errors. This is the default.
    #[default]
    Error,
    /// Log warnings.
    Warning,
    /// Log informational messages.
    Info,
    /// Log verbose informational messages.
    Verbose,
    /// Log debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl FfmpegLogLevel {
    /// The value FFmpeg expects after `-v`.
    pub fn as_arg(self) -> &'static str {
        match self {
            FfmpegLogLevel::Quiet => "quiet",
            FfmpegLogLevel::Panic => "panic",
            FfmpegLogLevel::Fatal => "fatal",
            FfmpegLogLevel::Error => "error",
            FfmpegLogLevel::Warning => "warning",
            FfmpegLogLevel::Info => "info",
            FfmpegLogLevel::Verbose => "verbose",
            FfmpegLogLevel::Debug => "debug",
            FfmpegLogLevel::Trace => "trace",
        }
    }

    /// Parse a level name (case-insensitive; `warn` is accepted).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Some(FfmpegLogLevel::Quiet),
            "panic" => Some(FfmpegLogLevel::Panic),
            "fatal" => Some(FfmpegLogLevel::Fatal),
            "error" => Some(FfmpegLogLevel::Error),
            "warning" | "warn" => Some(FfmpegLogLevel::Warning),
            "info" => Some(FfmpegLogLevel::Info),
            "verbose" => Some(FfmpegLogLevel::Verbose),
            "debug" => Some(FfmpegLogLevel::Debug),
            "trace" => Some(FfmpegLogLevel::Trace),
            _ => None,
        }
    }
}

/// Locate an FFmpeg tool by name.
///
/// Search order:
///
/// 1. `<program dir>/ffmpeg/<name>` (a bundled copy next to the running
///    program),
/// 2. `<program dir>/<name>`,
/// 3. the `PATH`,
/// 4. the bare `name`, left for the OS to resolve when it is spawned.
///
/// The platform executable suffix is appended to `name` in steps 1 and 2.
/// Nothing is cached between calls.
pub fn resolve_executable(name: &str) -> PathBuf {
    let program_directory = env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(Path::to_path_buf));
    resolve_executable_from(name, program_directory.as_deref())
}

/// [`resolve_executable`] with an explicit program directory.
///
/// `None` skips the bundled and same-directory candidates.
pub fn resolve_executable_from(name: &str, program_directory: Option<&Path>) -> PathBuf {
    let file_name = format!("{name}{}", env::consts::EXE_SUFFIX);

    if let Some(directory) = program_directory {
        let candidates = [
            directory.join(BUNDLED_DIRECTORY).join(&file_name),
            directory.join(&file_name),
        ];
        if let Some(found) = candidates.into_iter().find(|candidate| candidate.is_file()) {
            log::debug!("Using local {name} at {}", found.display());
            return found;
        }
    }

    match which::which(name) {
        Ok(found) => {
            log::debug!("Using {name} from PATH at {}", found.display());
            found
        }
        Err(_) => {
            log::debug!("{name} not found locally or on PATH, deferring to the OS");
            PathBuf::from(name)
        }
    }
}

/// Build a [`Command`] that does not open a console window on Windows.
pub(crate) fn hidden_command<S: AsRef<OsStr>>(program: S) -> Command {
    #[allow(unused_mut)]
    let mut command = Command::new(program);
    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);
    command
}

/// Subprocess implementation of [`FrameDecoder`].
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    log_level: FfmpegLogLevel,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegDecoder {
    /// Create a decoder with both executables located by
    /// [`resolve_executable`].
    pub fn new() -> Self {
        Self::with_paths(resolve_executable(FFMPEG), resolve_executable(FFPROBE))
    }

    /// Create a decoder with explicit executable paths.
    pub fn with_paths(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            log_level: FfmpegLogLevel::default(),
        }
    }

    /// Set the FFmpeg console verbosity.
    #[must_use]
    pub fn with_log_level(mut self, level: FfmpegLogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Path of the decoder executable.
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    /// Path of the prober executable.
    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }

    /// The configured console verbosity.
    pub fn log_level(&self) -> FfmpegLogLevel {
        self.log_level
    }

    /// Arguments for extracting one frame at `seconds` into `output`.
    pub(crate) fn extract_arguments(
        &self,
        video: &Path,
        seconds: f64,
        output: &Path,
    ) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-v".to_string(),
            self.log_level.as_arg().to_string(),
            "-ss".to_string(),
            seek_argument(seconds),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    fn run(&self, program: &Path, arguments: &[String]) -> Result<Output, FramepickError> {
        log::debug!("Running {} {}", program.display(), arguments.join(" "));
        hidden_command(program)
            .args(arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|error| FramepickError::DecodeUnavailable {
                program: program.to_path_buf(),
                reason: match error.kind() {
                    ErrorKind::NotFound => "executable not found".to_string(),
                    ErrorKind::PermissionDenied => "permission denied".to_string(),
                    _ => error.to_string(),
                },
            })
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn probe(&self, video: &Path) -> Result<VideoMetadata, FramepickError> {
        let mut arguments = vec!["-v".to_string(), self.log_level.as_arg().to_string()];
        arguments.extend(PROBE_ARGUMENTS.iter().map(|argument| argument.to_string()));
        arguments.push(video.to_string_lossy().into_owned());

        let output = self.run(&self.ffprobe, &arguments)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FramepickError::ProbeParseError(format!(
                "{} exited with {}: {}",
                self.ffprobe.display(),
                output.status,
                stderr.trim(),
            )));
        }

        let metadata = parse_probe_output(&output.stdout)?;
        log::debug!(
            "Probed {}: {}x{} @ {:.3} fps, {} frames",
            video.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
        );
        Ok(metadata)
    }

    fn extract_frame(
        &self,
        video: &Path,
        frame_index: u64,
        frames_per_second: f64,
        output: &Path,
    ) -> Result<(), FramepickError> {
        // A stale file would otherwise pass the existence check below.
        if output.exists() {
            fs::remove_file(output)?;
        }

        let seconds = frame_index_to_seconds(frame_index, frames_per_second);
        let arguments = self.extract_arguments(video, seconds, output);
        let result = self.run(&self.ffmpeg, &arguments)?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(FramepickError::FrameDecodeFailure {
                frame_index,
                reason: format!("decoder exited with {}: {}", result.status, stderr.trim()),
            });
        }
        if !output.is_file() {
            return Err(FramepickError::FrameDecodeFailure {
                frame_index,
                reason: format!("decoder produced no file at {}", output.display()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_round_trips_through_argument_names() {
        for level in [
            FfmpegLogLevel::Quiet,
            FfmpegLogLevel::Panic,
            FfmpegLogLevel::Fatal,
            FfmpegLogLevel::Error,
            FfmpegLogLevel::Warning,
            FfmpegLogLevel::Info,
            FfmpegLogLevel::Verbose,
            FfmpegLogLevel::Debug,
            FfmpegLogLevel::Trace,
        ] {
            assert_eq!(FfmpegLogLevel::parse(level.as_arg()), Some(level));
        }
        assert_eq!(FfmpegLogLevel::parse("WARN"), Some(FfmpegLogLevel::Warning));
        assert_eq!(FfmpegLogLevel::parse("loud"), None);
    }

    #[test]
    fn extract_arguments_seek_before_input() {
        let decoder = FfmpegDecoder::with_paths("ffmpeg", "ffprobe");
        let arguments =
            decoder.extract_arguments(Path::new("in.mp4"), 2.5, Path::new("out.png"));
        let seek = arguments.iter().position(|arg| arg == "-ss").unwrap();
        let input = arguments.iter().position(|arg| arg == "-i").unwrap();
        assert!(seek < input);
        assert_eq!(arguments[seek + 1], "2.500000");
        assert_eq!(arguments.last().map(String::as_str), Some("out.png"));
        assert!(arguments.windows(2).any(|pair| pair == ["-frames:v", "1"]));
    }

    #[test]
    fn missing_executable_is_decode_unavailable() {
        let decoder = FfmpegDecoder::with_paths(
            "/nonexistent/framepick-ffmpeg",
            "/nonexistent/framepick-ffprobe",
        );
        match decoder.probe(Path::new("in.mp4")) {
            Err(FramepickError::DecodeUnavailable { program, .. }) => {
                assert_eq!(program, PathBuf::from("/nonexistent/framepick-ffprobe"));
            }
            other => panic!("Expected DecodeUnavailable, got: {other:?}"),
        }
    }
}
