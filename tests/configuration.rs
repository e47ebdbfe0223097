//! SessionOptions, ExportOptions, and executable resolution tests.

mod common;

use std::path::{Path, PathBuf};

use common::{FakeDecoder, fake_video};
use framepick::{
    DEFAULT_CACHE_SIZE, ExportOptions, FfmpegLogLevel, SessionOptions, VideoSession,
    ffmpeg::resolve_executable_from,
};

// ── ExportOptions builder ──────────────────────────────────────────

#[test]
fn export_options_defaults() {
    let options = ExportOptions::new();
    let debug = format!("{options:?}");
    assert!(debug.contains("ExportOptions"));
    assert!(debug.contains("has_cancellation: false"));
    assert!(debug.contains("batch_size: 1"));
}

#[test]
fn export_options_with_batch_size() {
    let options = ExportOptions::new().with_batch_size(10);
    assert!(format!("{options:?}").contains("batch_size: 10"));
}

#[test]
fn export_options_with_batch_size_clamps_zero() {
    let options = ExportOptions::new().with_batch_size(0);
    // Clamped to 1.
    assert!(format!("{options:?}").contains("batch_size: 1"));
}

// ── SessionOptions builder ─────────────────────────────────────────

#[test]
fn session_options_defaults() {
    let options = SessionOptions::default();
    assert_eq!(options.cache_size, DEFAULT_CACHE_SIZE);
    assert_eq!(options.ffmpeg_path, None);
    assert_eq!(options.ffprobe_path, None);
    assert_eq!(options.log_level, FfmpegLogLevel::Error);
}

#[test]
fn session_options_explicit_tools() {
    let options = SessionOptions::new()
        .with_ffmpeg("/opt/ff/ffmpeg")
        .with_ffprobe("/opt/ff/ffprobe")
        .with_log_level(FfmpegLogLevel::Quiet)
        .with_cache_size(0);

    assert_eq!(options.cache_size, 1);

    let decoder = options.decoder();
    assert_eq!(decoder.ffmpeg_path(), Path::new("/opt/ff/ffmpeg"));
    assert_eq!(decoder.ffprobe_path(), Path::new("/opt/ff/ffprobe"));
    assert_eq!(decoder.log_level(), FfmpegLogLevel::Quiet);
}

#[test]
fn session_cache_size_applies_to_loads() {
    let mut session = VideoSession::with_decoder(FakeDecoder::new(100, 25.0)).with_cache_size(2);
    session.load(fake_video()).unwrap();
    assert_eq!(session.cache().unwrap().capacity(), 2);
}

// ── Executable resolution ──────────────────────────────────────────

fn touch_executable(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

fn executable_name(name: &str) -> String {
    format!("{name}{}", std::env::consts::EXE_SUFFIX)
}

#[test]
fn bundled_directory_wins() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let bundled = directory.path().join("ffmpeg").join(executable_name("ffprobe"));
    let beside = directory.path().join(executable_name("ffprobe"));
    touch_executable(&bundled);
    touch_executable(&beside);

    assert_eq!(resolve_executable_from("ffprobe", Some(directory.path())), bundled);
}

#[test]
fn program_directory_before_path() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let beside = directory.path().join(executable_name("ffmpeg"));
    touch_executable(&beside);

    assert_eq!(resolve_executable_from("ffmpeg", Some(directory.path())), beside);
}

#[test]
fn unknown_tool_falls_back_to_bare_name() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let resolved = resolve_executable_from("framepick-no-such-tool", Some(directory.path()));
    assert_eq!(resolved, PathBuf::from("framepick-no-such-tool"));
}
