//! Technical video metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Technical metadata probed from a video source.
///
/// Every field is optional: a probe failure (missing tool, corrupt stream,
/// unsupported codec) produces an all-`None` value instead of an error, and
/// downstream stages must tolerate missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Width in pixels
    pub width: Option<u32>,
    /// Height in pixels
    pub height: Option<u32>,
    /// Frame rate (fps)
    pub fps: Option<f64>,
}

impl VideoMetadata {
    /// Metadata for a clip the probe could not read at all.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// True when both dimensions are known.
    pub fn has_resolution(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    /// Duration, if known and positive.
    pub fn positive_duration(&self) -> Option<f64> {
        self.duration.filter(|d| *d > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_is_all_none() {
        let meta = VideoMetadata::unavailable();
        assert!(meta.duration.is_none());
        assert!(meta.width.is_none());
        assert!(meta.height.is_none());
        assert!(meta.fps.is_none());
        assert!(!meta.has_resolution());
    }

    #[test]
    fn test_positive_duration_filters_zero() {
        let meta = VideoMetadata {
            duration: Some(0.0),
            ..Default::default()
        };
        assert!(meta.positive_duration().is_none());

        let meta = VideoMetadata {
            duration: Some(12.5),
            ..Default::default()
        };
        assert_eq!(meta.positive_duration(), Some(12.5));
    }

    #[test]
    fn test_serializes_nulls() {
        let json = serde_json::to_value(VideoMetadata::unavailable()).unwrap();
        assert!(json["duration"].is_null());
        assert!(json["fps"].is_null());
    }
}
