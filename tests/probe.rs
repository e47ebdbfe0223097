//! Probe output parsing tests.
//!
//! The JSON here mirrors what `ffprobe -print_format json -show_format
//! -show_streams` emits, trimmed to the fields that matter.

use std::time::Duration;

use framepick::{FramepickError, parse_probe_output};

#[test]
fn parses_complete_report() {
    let output = br#"{
        "streams": [
            {"index": 0, "codec_type": "audio", "sample_rate": "48000"},
            {
                "index": 1,
                "codec_type": "video",
                "codec_name": "h264",
                "width": 1920,
                "height": 1080,
                "r_frame_rate": "30000/1001",
                "avg_frame_rate": "30000/1001",
                "nb_frames": "1798",
                "duration": "60.000000"
            }
        ],
        "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "60.026000"}
    }"#;

    let metadata = parse_probe_output(output).expect("Failed to parse");
    assert_eq!((metadata.width, metadata.height), (1920, 1080));
    assert!((metadata.frames_per_second - 29.97).abs() < 0.01);
    assert_eq!(metadata.frame_count, 1798);
    assert_eq!(metadata.duration, Duration::from_secs_f64(60.026));
}

#[test]
fn frame_count_derived_from_duration_when_missing() {
    let output = br#"{
        "streams": [{"codec_type": "video", "width": 320, "height": 240, "r_frame_rate": "24/1"}],
        "format": {"duration": "10.0"}
    }"#;

    let metadata = parse_probe_output(output).unwrap();
    assert_eq!(metadata.frame_count, 240);
    assert!((metadata.frames_per_second - 24.0).abs() < f64::EPSILON);
}

#[test]
fn frame_count_not_available_falls_back_to_duration() {
    let output = br#"{
        "streams": [{
            "codec_type": "video", "width": 320, "height": 240,
            "r_frame_rate": "25/1", "nb_frames": "N/A", "duration": "4.1"
        }],
        "format": {}
    }"#;

    let metadata = parse_probe_output(output).unwrap();
    // floor(4.1 * 25)
    assert_eq!(metadata.frame_count, 102);
}

#[test]
fn missing_frame_rate_defaults_to_thirty() {
    let output = br#"{
        "streams": [{"codec_type": "video", "width": 64, "height": 64}],
        "format": {"duration": "2"}
    }"#;

    let metadata = parse_probe_output(output).unwrap();
    assert!((metadata.frames_per_second - 30.0).abs() < f64::EPSILON);
    assert_eq!(metadata.frame_count, 60);
}

#[test]
fn zero_denominator_defaults_to_thirty() {
    let output = br#"{"streams": [{"codec_type": "video", "r_frame_rate": "0/0"}]}"#;
    let metadata = parse_probe_output(output).unwrap();
    assert!((metadata.frames_per_second - 30.0).abs() < f64::EPSILON);
}

#[test]
fn average_rate_used_when_real_rate_unusable() {
    let output = br#"{"streams": [{
        "codec_type": "video", "r_frame_rate": "0/1", "avg_frame_rate": "50/1"
    }]}"#;
    let metadata = parse_probe_output(output).unwrap();
    assert!((metadata.frames_per_second - 50.0).abs() < f64::EPSILON);
}

#[test]
fn no_duration_and_no_count_means_zero_frames() {
    let output = br#"{"streams": [{"codec_type": "video", "r_frame_rate": "25/1"}]}"#;
    let metadata = parse_probe_output(output).unwrap();
    assert_eq!(metadata.frame_count, 0);
    assert_eq!(metadata.last_frame(), None);
}

#[test]
fn oversized_duration_is_an_error() {
    let output = br#"{
        "format": {"duration": "1e20"},
        "streams": [{"codec_type": "video", "width": 320, "height": 240, "r_frame_rate": "24/1"}]
    }"#;
    let error = parse_probe_output(output).unwrap_err();
    assert!(matches!(error, FramepickError::ProbeParseError(_)));
    assert!(error.to_string().contains("invalid duration"));
}

#[test]
fn no_video_stream_is_an_error() {
    let output = br#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "3.0"}}"#;
    let error = parse_probe_output(output).unwrap_err();
    assert!(matches!(error, FramepickError::ProbeParseError(_)));
    assert!(error.to_string().contains("no video stream"));
}

#[test]
fn unparseable_frame_rate_is_an_error() {
    let output = br#"{"streams": [{"codec_type": "video", "r_frame_rate": "fast"}]}"#;
    assert!(matches!(
        parse_probe_output(output).unwrap_err(),
        FramepickError::ProbeParseError(_)
    ));
}

#[test]
fn invalid_json_is_an_error() {
    let outputs: [&[u8]; 3] = [b"", b"not json", b"{\"streams\": ["];
    for output in outputs {
        assert!(matches!(
            parse_probe_output(output).unwrap_err(),
            FramepickError::ProbeParseError(_)
        ));
    }
}
