//! Error handling integration tests.
//!
//! These verify that meaningful errors are returned for the failure
//! conditions callers need to tell apart.

mod common;

use std::error::Error;

use common::{FakeDecoder, fake_video};
use framepick::{FfmpegDecoder, FramepickError, SessionOptions, VideoSession};

#[test]
fn load_with_missing_prober_names_the_program() {
    let options = SessionOptions::new()
        .with_ffmpeg("/nonexistent/framepick-ffmpeg")
        .with_ffprobe("/nonexistent/framepick-ffprobe");
    let mut session = VideoSession::with_options(&options);

    let error = session.load("input.mp4").unwrap_err();
    let message = error.to_string();
    assert!(
        message.contains("Failed to load video"),
        "Error message should mention the load failure: {message}",
    );

    let source = error.source().expect("LoadError should carry its cause");
    assert!(
        source.to_string().contains("framepick-ffprobe"),
        "Cause should name the prober: {source}",
    );
    match error {
        FramepickError::LoadError { source, .. } => {
            assert!(matches!(*source, FramepickError::DecodeUnavailable { .. }));
        }
        other => panic!("Expected LoadError, got: {other}"),
    }
    assert!(!session.is_loaded());
}

#[test]
fn extract_with_missing_decoder_is_decode_unavailable() {
    use framepick::FrameDecoder;

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let decoder = FfmpegDecoder::with_paths("/nonexistent/framepick-ffmpeg", "ffprobe");
    let error = decoder
        .extract_frame(
            std::path::Path::new("input.mp4"),
            0,
            30.0,
            &directory.path().join("frame.png"),
        )
        .unwrap_err();
    assert!(matches!(error, FramepickError::DecodeUnavailable { .. }));
}

#[test]
fn frame_errors_carry_the_index() {
    let mut session = VideoSession::with_decoder(FakeDecoder::new(10, 25.0).failing_on([6]));
    session.load(fake_video()).unwrap();

    let message = session.try_frame(6).unwrap_err().to_string();
    assert!(message.contains("frame 6"), "{message}");

    let message = session.try_frame(12).unwrap_err().to_string();
    assert!(message.contains("Frame 12 is out of range"), "{message}");
    assert!(message.contains("10 frames"), "{message}");
}

#[test]
fn empty_selection_message() {
    let mut session = VideoSession::with_decoder(FakeDecoder::new(10, 25.0));
    session.load(fake_video()).unwrap();

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let error = session
        .export_selected(directory.path(), &Default::default())
        .unwrap_err();
    assert_eq!(error.to_string(), "No frames selected for export");
}

#[test]
fn operations_without_video() {
    let mut session = VideoSession::with_decoder(FakeDecoder::new(10, 25.0));
    let directory = tempfile::tempdir().expect("Failed to create temp dir");

    assert!(matches!(
        session.export_current_frame(directory.path()).unwrap_err(),
        FramepickError::NoVideoLoaded
    ));
    assert!(matches!(
        session.select(0).unwrap_err(),
        FramepickError::NoVideoLoaded
    ));
    assert_eq!(session.frame_label(0), None);
}
