//! Metadata probing.
//!
//! Parses the structured JSON report of the external prober into
//! [`VideoMetadata`], and provides [`MediaProbe`] for quick metadata-only
//! inspection of files without opening a [`VideoSession`](crate::VideoSession).

use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::{
    decoder::FrameDecoder, error::FramepickError, ffmpeg::FfmpegDecoder,
    metadata::VideoMetadata,
};

/// Frame rate assumed when the stream reports none, or a zero denominator.
pub(crate) const FALLBACK_FRAMES_PER_SECOND: f64 = 30.0;

/// Arguments asking the prober for a JSON report of format and streams.
pub(crate) const PROBE_ARGUMENTS: [&str; 4] =
    ["-print_format", "json", "-show_format", "-show_streams"];

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

/// Parse the prober's JSON output into [`VideoMetadata`].
///
/// The first stream whose `codec_type` is `video` is used. The frame count
/// prefers the stream's `nb_frames`; when that is absent (or `N/A`), it is
/// derived as `floor(duration * frames_per_second)`.
///
/// # Errors
///
/// Returns [`FramepickError::ProbeParseError`] if the output is not valid
/// JSON, has no video stream, or reports frame rates none of which parse
/// to a positive value.
pub fn parse_probe_output(output: &[u8]) -> Result<VideoMetadata, FramepickError> {
    let report: ProbeReport = serde_json::from_slice(output)
        .map_err(|error| FramepickError::ProbeParseError(format!("invalid JSON: {error}")))?;

    let stream = report
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| FramepickError::ProbeParseError("no video stream found".to_string()))?;

    let reported_rates = [
        stream.r_frame_rate.as_deref(),
        stream.avg_frame_rate.as_deref(),
    ];
    let parsed_rate = reported_rates
        .iter()
        .flatten()
        .find_map(|rate| parse_frame_rate(rate));
    let frames_per_second = match parsed_rate {
        Some(rate) => rate,
        None if reported_rates.iter().all(Option::is_none) => FALLBACK_FRAMES_PER_SECOND,
        None => {
            return Err(FramepickError::ProbeParseError(format!(
                "unparseable frame rate (r_frame_rate={:?}, avg_frame_rate={:?})",
                stream.r_frame_rate, stream.avg_frame_rate,
            )));
        }
    };

    let duration_seconds = report
        .format
        .as_ref()
        .and_then(|format| parse_seconds(format.duration.as_deref()))
        .or_else(|| parse_seconds(stream.duration.as_deref()))
        .unwrap_or(0.0);
    let duration = Duration::try_from_secs_f64(duration_seconds).map_err(|error| {
        FramepickError::ProbeParseError(format!("invalid duration {duration_seconds}: {error}"))
    })?;

    let frame_count = match stream
        .nb_frames
        .as_deref()
        .and_then(|count| count.trim().parse::<u64>().ok())
    {
        Some(count) => count,
        None if duration_seconds > 0.0 => (duration_seconds * frames_per_second).floor() as u64,
        None => 0,
    };

    Ok(VideoMetadata {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        frames_per_second,
        frame_count,
        duration,
    })
}

/// Parse a frame rate such as `"30000/1001"` or `"29.97"`.
///
/// A fraction with a zero denominator yields the 30 fps fallback. Returns
/// `None` for text that is neither a fraction nor a number, and for
/// non-positive rates.
pub(crate) fn parse_frame_rate(rate: &str) -> Option<f64> {
    let rate = rate.trim();
    let value = if let Some((numerator, denominator)) = rate.split_once('/') {
        let numerator: f64 = numerator.trim().parse().ok()?;
        let denominator: f64 = denominator.trim().parse().ok()?;
        if denominator == 0.0 {
            return Some(FALLBACK_FRAMES_PER_SECOND);
        }
        numerator / denominator
    } else {
        rate.parse().ok()?
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
}

/// Lightweight metadata probe.
///
/// Runs the prober once per file without allocating a session or scratch
/// directory.
///
/// # Example
///
/// ```no_run
/// use framepick::MediaProbe;
///
/// let metadata = MediaProbe::probe("input.mp4")?;
/// println!("{} frames", metadata.frame_count);
/// # Ok::<(), framepick::FramepickError>(())
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Probe a media file with the default [`FfmpegDecoder`].
    ///
    /// # Errors
    ///
    /// [`FramepickError::DecodeUnavailable`] if the prober cannot run, or
    /// [`FramepickError::ProbeParseError`] if its output is unusable.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<VideoMetadata, FramepickError> {
        FfmpegDecoder::new().probe(path.as_ref())
    }

    /// Probe multiple media files.
    ///
    /// Files that cannot be probed produce an `Err` entry rather than
    /// aborting the batch. The prober is resolved once for the whole batch.
    pub fn probe_many<P: AsRef<Path>>(paths: &[P]) -> Vec<Result<VideoMetadata, FramepickError>> {
        let decoder = FfmpegDecoder::new();
        paths
            .iter()
            .map(|path| decoder.probe(path.as_ref()))
            .collect()
    }
}
