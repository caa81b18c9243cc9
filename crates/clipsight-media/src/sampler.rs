//! Representative still-frame extraction.
//!
//! Samples a fixed number of frames from the interior of the clip when the
//! duration is known, or falls back to the first N frames at 1 fps when it
//! is not. Extraction is best-effort per timestamp: failures are dropped,
//! and an all-failed extraction yields an empty batch, not an error.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use futures::{stream, StreamExt};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::MediaResult;

/// Floor for seek timestamps, to stay clear of container start quirks.
const MIN_SEEK_SECONDS: f64 = 0.1;

/// Sampler configuration.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Target number of frames to extract
    pub frame_count: usize,
    /// Maximum concurrent FFmpeg frame grabs
    pub max_parallel: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            frame_count: 10,
            max_parallel: 4,
        }
    }
}

/// A single extracted still frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Timestamp in seconds the frame was taken at
    pub timestamp: f64,
    /// Path of the JPEG file inside the batch workdir
    pub path: PathBuf,
}

/// An ordered batch of extracted frames.
///
/// Owns the temp directory holding the frame files; storage is reclaimed
/// when the batch drops, after the last consumer is done with it.
#[derive(Debug)]
pub struct FrameBatch {
    frames: Vec<Frame>,
    _workdir: TempDir,
}

impl FrameBatch {
    /// Frames in ascending timestamp order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Extract up to `config.frame_count` representative frames.
///
/// Only workdir creation can fail; a missing FFmpeg or per-timestamp
/// extraction failures degrade to a smaller (possibly empty) batch.
pub async fn sample_frames(
    video: &Path,
    duration: Option<f64>,
    config: &SamplerConfig,
) -> MediaResult<FrameBatch> {
    let workdir = TempDir::new()?;

    let ffmpeg = match which::which("ffmpeg") {
        Ok(p) => p,
        Err(_) => {
            warn!("ffmpeg not found in PATH, no frames sampled");
            return Ok(FrameBatch {
                frames: Vec::new(),
                _workdir: workdir,
            });
        }
    };

    let frames = match duration.filter(|d| *d > 0.0) {
        Some(duration) => {
            sample_at_timestamps(&ffmpeg, video, workdir.path(), duration, config).await
        }
        None => {
            debug!("Duration unknown, falling back to first-N extraction at 1 fps");
            sample_first_frames(&ffmpeg, video, workdir.path(), config.frame_count).await
        }
    };

    debug!(
        requested = config.frame_count,
        extracted = frames.len(),
        "Frame sampling finished"
    );

    Ok(FrameBatch {
        frames,
        _workdir: workdir,
    })
}

/// Evenly spaced interior timestamps: `duration * (i+1) / (count+1)`.
///
/// Never lands on time 0 or exactly at the end, to avoid black or
/// transition frames.
pub fn plan_timestamps(duration: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| (duration * (i + 1) as f64 / (count + 1) as f64).max(MIN_SEEK_SECONDS))
        .collect()
}

/// Grab one frame per planned timestamp, bounded-concurrent, reassembled
/// in timestamp order.
async fn sample_at_timestamps(
    ffmpeg: &Path,
    video: &Path,
    workdir: &Path,
    duration: f64,
    config: &SamplerConfig,
) -> Vec<Frame> {
    let grabs = plan_timestamps(duration, config.frame_count)
        .into_iter()
        .enumerate()
        .map(|(idx, t)| {
            let ffmpeg = ffmpeg.to_path_buf();
            let video = video.to_path_buf();
            let out = workdir.join(format!("frame_{idx:02}.jpg"));
            async move { grab_frame(&ffmpeg, &video, t, &out).await }
        });

    let mut frames: Vec<Frame> = stream::iter(grabs)
        .buffer_unordered(config.max_parallel.max(1))
        .filter_map(|f| async move { f })
        .collect()
        .await;

    frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    frames
}

/// Seek-and-grab a single frame; `None` on any failure.
async fn grab_frame(ffmpeg: &Path, video: &Path, timestamp: f64, out: &Path) -> Option<Frame> {
    let status = Command::new(ffmpeg)
        .args(["-ss", &format!("{timestamp:.3}"), "-i"])
        .arg(video)
        .args(["-frames:v", "1", "-q:v", "2", "-y"])
        .arg(out)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(s) if s.success() && out.exists() => Some(Frame {
            timestamp,
            path: out.to_path_buf(),
        }),
        Ok(_) | Err(_) => {
            warn!(timestamp, "Dropped frame: extraction failed");
            None
        }
    }
}

/// Duration-unknown fallback: first `count` frames at 1 fps.
///
/// Timestamps are the frame indices, since real positions are unknown.
async fn sample_first_frames(
    ffmpeg: &Path,
    video: &Path,
    workdir: &Path,
    count: usize,
) -> Vec<Frame> {
    let pattern = workdir.join("seq_%02d.jpg");
    let status = Command::new(ffmpeg)
        .arg("-i")
        .arg(video)
        .args(["-vf", "fps=1", "-frames:v", &count.to_string(), "-y"])
        .arg(&pattern)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if !matches!(status, Ok(s) if s.success()) {
        warn!("First-N frame extraction failed, no frames sampled");
        return Vec::new();
    }

    // ffmpeg numbers sequence outputs from 1
    (1..=count)
        .filter_map(|i| {
            let path = workdir.join(format!("seq_{i:02}.jpg"));
            path.exists().then(|| Frame {
                timestamp: (i - 1) as f64,
                path,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_timestamps_interior() {
        let ts = plan_timestamps(180.0, 8);
        assert_eq!(ts.len(), 8);
        // Strictly increasing, never 0 or the clip end
        for pair in ts.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(ts[0] > 0.0);
        assert!(*ts.last().unwrap() < 180.0);
        assert!((ts[0] - 20.0).abs() < 1e-9);
        assert!((ts[7] - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_timestamps_short_clip_floor() {
        let ts = plan_timestamps(0.5, 4);
        assert!(ts.iter().all(|t| *t >= MIN_SEEK_SECONDS));
    }

    #[test]
    fn test_plan_timestamps_zero_count() {
        assert!(plan_timestamps(60.0, 0).is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_for_unreadable_video() {
        // A nonexistent input must degrade to an empty batch, not error
        let config = SamplerConfig::default();
        let batch = sample_frames(Path::new("/nonexistent/clip.mp4"), Some(60.0), &config)
            .await
            .unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
