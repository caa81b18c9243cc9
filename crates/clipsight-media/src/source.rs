//! Video source acquisition.
//!
//! The pipeline needs two independent reads of the source (one for the
//! metadata probe, one for frame extraction), so URL sources are downloaded
//! once to a temp file and each tool then opens its own handle on it.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// A video input: either a fetchable URL or a local file.
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// HTTP(S) URL to download
    Url(String),
    /// Already-present local file
    File(PathBuf),
}

impl VideoSource {
    /// Build a source from a CLI-style argument.
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            Self::Url(input.to_string())
        } else {
            Self::File(PathBuf::from(input))
        }
    }

    /// Acquire a local copy of the source.
    ///
    /// This is the only fatal step of an analysis: an unreachable URL or a
    /// missing file is reported to the caller instead of degrading.
    pub async fn fetch(&self) -> MediaResult<LocalVideo> {
        match self {
            Self::File(path) => {
                if !path.exists() {
                    return Err(MediaError::FileNotFound(path.clone()));
                }
                debug!(path = %path.display(), "Using local video file");
                Ok(LocalVideo {
                    path: path.clone(),
                    _workdir: None,
                })
            }
            Self::Url(url) => download(url).await,
        }
    }
}

/// A locally readable copy of the source video.
///
/// Downloaded copies own their temp directory; the file is reclaimed when
/// the value drops.
#[derive(Debug)]
pub struct LocalVideo {
    path: PathBuf,
    _workdir: Option<TempDir>,
}

impl LocalVideo {
    /// Path to the readable video file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Download a URL source into a fresh temp directory.
async fn download(url: &str) -> MediaResult<LocalVideo> {
    let workdir = TempDir::new()?;
    let path = workdir.path().join("source.mp4");

    let response = reqwest::get(url)
        .await
        .map_err(|e| MediaError::source_unreachable(format!("request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(MediaError::source_unreachable(format!(
            "{} returned {}",
            url,
            response.status()
        )));
    }

    let mut file = tokio::fs::File::create(&path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| MediaError::source_unreachable(format!("read failed: {e}")))?;
        written += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    if written == 0 {
        return Err(MediaError::source_unreachable("empty response body"));
    }

    info!(url, bytes = written, "Downloaded source video");
    Ok(LocalVideo {
        path,
        _workdir: Some(workdir),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_vs_file() {
        assert!(matches!(
            VideoSource::parse("https://cdn.example.com/clip.mp4"),
            VideoSource::Url(_)
        ));
        assert!(matches!(
            VideoSource::parse("/tmp/clip.mp4"),
            VideoSource::File(_)
        ));
        assert!(matches!(
            VideoSource::parse("clip.mp4"),
            VideoSource::File(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_fatal() {
        let source = VideoSource::File(PathBuf::from("/nonexistent/clip.mp4"));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
