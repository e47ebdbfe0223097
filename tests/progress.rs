//! Progress and cancellation integration tests.

mod common;

use std::sync::{Arc, Mutex};

use common::{FakeDecoder, fake_video};
use framepick::{
    CancellationToken, ExportOptions, FramepickError, GifExportSpec, OperationType,
    ProgressCallback, ProgressInfo, VideoSession,
};

// ── CancellationToken ──────────────────────────────────────────────

#[test]
fn cancellation_token_default_not_cancelled() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn cancellation_token_clone_shares_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn cancellation_token_default_trait() {
    let token = CancellationToken::default();
    assert!(!token.is_cancelled());
}

// ── ProgressInfo ───────────────────────────────────────────────────

struct RecordingProgress {
    infos: Mutex<Vec<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

/// Cancels the token after `limit` reports.
struct CancelAfter {
    token: CancellationToken,
    limit: u64,
}

impl ProgressCallback for CancelAfter {
    fn on_progress(&self, info: &ProgressInfo) {
        if info.current >= self.limit {
            self.token.cancel();
        }
    }
}

fn session(selected: impl IntoIterator<Item = u64>) -> VideoSession<FakeDecoder> {
    let mut session = VideoSession::with_decoder(FakeDecoder::new(100, 25.0));
    session.load(fake_video()).unwrap();
    for frame in selected {
        session.select(frame).unwrap();
    }
    session
}

#[test]
fn batch_size_limits_reports() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(0..10);

    let recorder = Arc::new(RecordingProgress {
        infos: Mutex::new(Vec::new()),
    });
    let options = ExportOptions::new()
        .with_progress(recorder.clone())
        .with_batch_size(4);
    session.export_selected(output.path(), &options).unwrap();

    let infos = recorder.infos.lock().unwrap();
    let positions: Vec<u64> = infos.iter().map(|info| info.current).collect();
    // Every 4 frames, then the final report.
    assert_eq!(positions, vec![4, 8, 10]);

    let last = infos.last().unwrap();
    assert_eq!(last.percentage, Some(100.0));
    assert_eq!(last.estimated_remaining, Some(std::time::Duration::ZERO));
    assert_eq!(infos[0].current_frame, Some(3));
}

#[test]
fn gif_export_reports_gif_operation() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session([1, 2]);

    let recorder = Arc::new(RecordingProgress {
        infos: Mutex::new(Vec::new()),
    });
    let options = ExportOptions::new().with_progress(recorder.clone());
    session
        .export_gif(output.path().join("p.gif"), &GifExportSpec::new(), &options)
        .unwrap();

    let infos = recorder.infos.lock().unwrap();
    assert!(!infos.is_empty());
    assert!(infos.iter().all(|info| info.operation == OperationType::GifExport));
}

#[test]
fn cancellation_mid_export_stops_further_frames() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(0..10);

    let token = CancellationToken::new();
    let options = ExportOptions::new()
        .with_progress(Arc::new(CancelAfter {
            token: token.clone(),
            limit: 3,
        }))
        .with_cancellation(token);

    let error = session.export_selected(output.path(), &options).unwrap_err();
    assert!(matches!(error, FramepickError::Cancelled));

    // The three frames finished before the token fired stay on disk.
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 3);
    assert_eq!(session.decoder().extract_calls(), 3);
}

#[test]
fn cancelled_gif_export_writes_nothing() {
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let gif_path = output.path().join("cancelled.gif");
    let mut session = session(0..5);

    let token = CancellationToken::new();
    token.cancel();
    let options = ExportOptions::new().with_cancellation(token);

    let error = session
        .export_gif(&gif_path, &GifExportSpec::new(), &options)
        .unwrap_err();
    assert!(matches!(error, FramepickError::Cancelled));
    assert!(!gif_path.exists());
}
