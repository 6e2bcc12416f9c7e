// Frame extraction
//
// Trait seam over the decoder plus the capture-time selection policy. The
// default implementation drives system ffmpeg/ffprobe: ffprobe for duration,
// frame rate and dimensions, ffmpeg for one raw RGB frame at the target time
// (nearest decodable frame at or before it; no frame-accuracy guarantee).

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use crate::error::{Result, ThumbError};
use crate::tools;

/// Container metadata the engine needs to pick and decode a frame.
#[derive(Debug, Clone, Copy)]
pub struct VideoMetadata {
    pub duration_secs: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

/// One decoded frame, RGB24, row-major.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub trait FrameExtractor {
    fn probe(&self, path: &Path) -> Result<VideoMetadata>;
    fn extract_frame(
        &self,
        path: &Path,
        meta: &VideoMetadata,
        target_secs: f64,
    ) -> Result<RawFrame>;
}

/// Pick the capture time for a video.
///
/// The configured value wins when it parses and fits inside the duration;
/// everything else (blank, non-numeric, past the end) falls back to the
/// middle of the video.
pub fn select_capture_time(requested: Option<&str>, duration_secs: f64) -> f64 {
    if let Some(raw) = requested {
        let raw = raw.trim();
        if !raw.is_empty() {
            if let Ok(target) = raw.parse::<f64>() {
                if target >= 0.0 && duration_secs >= target {
                    return target;
                }
            }
        }
    }
    duration_secs / 2.0
}

/// Nearest frame index at or before the target time.
pub fn frame_index(target_secs: f64, fps: f64) -> u64 {
    (target_secs * fps).floor() as u64
}

// ---- ffprobe JSON shapes ----

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    streams: Option<Vec<FfprobeStream>>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Default extractor: system ffmpeg/ffprobe via subprocess.
#[derive(Debug, Default)]
pub struct FfmpegExtractor;

impl FrameExtractor for FfmpegExtractor {
    fn probe(&self, path: &Path) -> Result<VideoMetadata> {
        let output = Command::new(tools::ffprobe_path())
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output()
            .map_err(|e| ThumbError::Extraction(format!("failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ThumbError::Extraction(format!("ffprobe failed: {}", stderr)));
        }

        let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| ThumbError::Extraction(format!("bad ffprobe output: {}", e)))?;

        let stream = probe
            .streams
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| ThumbError::Extraction("no video stream found".to_string()))?;

        let fps = parse_frame_rate(stream.r_frame_rate.as_deref())
            .filter(|f| *f > 0.0)
            .ok_or_else(|| ThumbError::Extraction("no usable frame rate".to_string()))?;

        let duration_secs = stream
            .duration
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| {
                probe
                    .format
                    .as_ref()
                    .and_then(|f| f.duration.as_deref())
                    .and_then(|s| s.parse::<f64>().ok())
            })
            .ok_or_else(|| ThumbError::Extraction("no duration in container".to_string()))?;

        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(ThumbError::Extraction("no frame dimensions".to_string())),
        };

        Ok(VideoMetadata {
            duration_secs,
            fps,
            width,
            height,
        })
    }

    fn extract_frame(
        &self,
        path: &Path,
        meta: &VideoMetadata,
        target_secs: f64,
    ) -> Result<RawFrame> {
        let seek = format_seek(target_secs);
        let output = Command::new(tools::ffmpeg_path())
            .args(["-v", "error", "-ss", &seek])
            .arg("-i")
            .arg(path)
            .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .output()
            .map_err(|e| ThumbError::Extraction(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ThumbError::Extraction(format!("ffmpeg failed: {}", stderr)));
        }

        let expected = meta.width as usize * meta.height as usize * 3;
        if output.stdout.len() != expected {
            return Err(ThumbError::Extraction(format!(
                "cannot decode frame at {:.3}s (got {} bytes, expected {})",
                target_secs,
                output.stdout.len(),
                expected
            )));
        }

        Ok(RawFrame {
            width: meta.width,
            height: meta.height,
            pixels: output.stdout,
        })
    }
}

/// Parse a frame rate string like "30000/1001" to f64.
fn parse_frame_rate(rate_str: Option<&str>) -> Option<f64> {
    let rate_str = rate_str?;
    if let Some((num, den)) = rate_str.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    rate_str.parse().ok()
}

/// Format seconds as HH:MM:SS.mmm for ffmpeg.
fn format_seek(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u32;
    let minutes = ((seconds % 3600.0) / 60.0) as u32;
    let secs = seconds % 60.0;
    format!("{:02}:{:02}:{:06.3}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_time_explicit_within_duration() {
        assert_eq!(select_capture_time(Some("3"), 10.0), 3.0);
        assert_eq!(select_capture_time(Some(" 2.5 "), 10.0), 2.5);
    }

    #[test]
    fn test_capture_time_fallback_to_midpoint() {
        // Past the end of a 10s / 30fps video: midpoint, frame 150
        assert_eq!(select_capture_time(Some("999"), 10.0), 5.0);
        assert_eq!(frame_index(select_capture_time(Some("999"), 10.0), 30.0), 150);

        assert_eq!(select_capture_time(None, 20.0), 10.0);
        assert_eq!(select_capture_time(Some(""), 4.0), 2.0);
        assert_eq!(select_capture_time(Some("abc"), 8.0), 4.0);
        assert_eq!(select_capture_time(Some("-1"), 8.0), 4.0);
    }

    #[test]
    fn test_frame_index_floors() {
        assert_eq!(frame_index(5.0, 29.97), 149);
        assert_eq!(frame_index(2.0, 30.0), 60);
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate(Some("30000/1001")), Some(30000.0 / 1001.0));
        assert_eq!(parse_frame_rate(Some("25")), Some(25.0));
        assert_eq!(parse_frame_rate(Some("0/0")), None);
        assert_eq!(parse_frame_rate(None), None);
    }

    #[test]
    fn test_format_seek() {
        assert_eq!(format_seek(0.0), "00:00:00.000");
        assert_eq!(format_seek(5.5), "00:00:05.500");
        assert_eq!(format_seek(3661.0), "01:01:01.000");
    }
}
