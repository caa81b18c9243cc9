//! Best-effort FFprobe metadata extraction.
//!
//! The probe never fails an analysis: any problem (missing tool, corrupt
//! stream, unsupported codec, unparsable output) yields all-null metadata.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use clipsight_models::VideoMetadata;

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

/// Probe a video file for technical metadata.
///
/// Returns [`VideoMetadata::unavailable`] on any failure.
pub async fn probe_metadata(path: impl AsRef<Path>) -> VideoMetadata {
    let path = path.as_ref();

    let ffprobe = match which::which("ffprobe") {
        Ok(p) => p,
        Err(_) => {
            warn!("ffprobe not found in PATH, metadata unavailable");
            return VideoMetadata::unavailable();
        }
    };

    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match output {
        Ok(o) if o.status.success() => o,
        Ok(o) => {
            warn!(
                stderr = %String::from_utf8_lossy(&o.stderr),
                "ffprobe exited with error, metadata unavailable"
            );
            return VideoMetadata::unavailable();
        }
        Err(e) => {
            warn!(error = %e, "Failed to spawn ffprobe, metadata unavailable");
            return VideoMetadata::unavailable();
        }
    };

    let meta = metadata_from_json(&output.stdout);
    debug!(?meta, "Probed video metadata");
    meta
}

/// Parse FFprobe JSON output into metadata, tolerating any missing field.
fn metadata_from_json(bytes: &[u8]) -> VideoMetadata {
    let probe: FfprobeOutput = match serde_json::from_slice(bytes) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "Unparsable ffprobe output, metadata unavailable");
            return VideoMetadata::unavailable();
        }
    };

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or_else(|| video_stream.and_then(|s| s.duration.as_ref()))
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);

    let fps = video_stream
        .and_then(|s| s.avg_frame_rate.as_ref().or(s.r_frame_rate.as_ref()))
        .and_then(|r| parse_frame_rate(r));

    VideoMetadata {
        duration,
        width: video_stream.and_then(|s| s.width),
        height: video_stream.and_then(|s| s.height),
        fps,
    }
}

/// Parse a frame rate string (e.g. "30000/1001" or "29.97").
///
/// A zero denominator or malformed input yields `None`, never a panic.
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 && num.is_finite() {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok().filter(|f: &f64| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_frame_rate_bad_input() {
        assert!(parse_frame_rate("30/0").is_none());
        assert!(parse_frame_rate("abc").is_none());
        assert!(parse_frame_rate("x/y").is_none());
        assert!(parse_frame_rate("").is_none());
    }

    #[test]
    fn test_metadata_from_full_output() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio"},
                {"codec_type": "video", "width": 1920, "height": 1080,
                 "r_frame_rate": "30000/1001", "avg_frame_rate": "30000/1001"}
            ],
            "format": {"duration": "180.500000"}
        }"#;
        let meta = metadata_from_json(json);
        assert_eq!(meta.width, Some(1920));
        assert_eq!(meta.height, Some(1080));
        assert!((meta.duration.unwrap() - 180.5).abs() < 0.001);
        assert!((meta.fps.unwrap() - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_metadata_from_garbage() {
        let meta = metadata_from_json(b"not json at all");
        assert_eq!(meta, VideoMetadata::unavailable());
    }

    #[test]
    fn test_metadata_missing_video_stream() {
        let json = br#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        let meta = metadata_from_json(json);
        assert!(meta.width.is_none());
        assert!(meta.fps.is_none());
        assert!(meta.duration.is_none());
    }

    #[test]
    fn test_metadata_stream_duration_fallback() {
        let json = br#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 360,
                         "duration": "42.0"}]
        }"#;
        let meta = metadata_from_json(json);
        assert_eq!(meta.duration, Some(42.0));
        assert_eq!(meta.width, Some(640));
    }
}
