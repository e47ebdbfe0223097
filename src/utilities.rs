//! Internal utility functions.
//!
//! Helpers for timestamp conversion, output naming, and dimension math that
//! are shared between the session, the decoder gateway, and the GIF
//! assembler.

/// Convert a frame index to a seek position in seconds.
///
/// This is the plain `frame_index / frames_per_second` mapping. It is an
/// approximation for variable-frame-rate sources. Returns `0.0` when the
/// frame rate is not positive.
pub fn frame_index_to_seconds(frame_index: u64, frames_per_second: f64) -> f64 {
    if frames_per_second > 0.0 {
        frame_index as f64 / frames_per_second
    } else {
        0.0
    }
}

/// Format a seek position for the decoder's `-ss` argument.
pub(crate) fn seek_argument(seconds: f64) -> String {
    format!("{:.6}", seconds.max(0.0))
}

/// File name for an exported still: the 1-based frame number, zero-padded
/// to six digits.
///
/// ```
/// assert_eq!(framepick::utilities::still_file_name(0), "frame_000001.png");
/// assert_eq!(framepick::utilities::still_file_name(41), "frame_000042.png");
/// ```
pub fn still_file_name(frame_index: u64) -> String {
    format!("frame_{:06}.png", frame_index + 1)
}

/// Height after uniformly scaling `source_width` to `target_width`.
///
/// Computed as `round(source_height * target_width / source_width)`, never
/// less than one pixel.
pub fn scaled_height(source_width: u32, source_height: u32, target_width: u32) -> u32 {
    if source_width == 0 {
        return source_height.max(1);
    }
    let ratio = target_width as f64 / source_width as f64;
    ((source_height as f64 * ratio).round() as u32).max(1)
}

/// Per-frame display duration in milliseconds for an output rate.
pub fn frame_duration_millis(target_fps: u32) -> u32 {
    (1000.0 / target_fps.max(1) as f64).round() as u32
}

/// Human-readable label for a frame: 1-based number plus its timestamp.
pub fn frame_label(frame_index: u64, frames_per_second: f64) -> String {
    format!(
        "Frame {} ({:.2}s)",
        frame_index + 1,
        frame_index_to_seconds(frame_index, frames_per_second)
    )
}
