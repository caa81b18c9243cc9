//! Content-agnostic heuristic detection backend.
//!
//! Terminal fallback when no model is available: uses the compressed frame
//! size as a visual-detail proxy and reports a single coarse scene label.

use async_trait::async_trait;

use clipsight_models::LabeledObject;

use crate::error::MediaResult;
use crate::sampler::Frame;

use super::DetectionBackend;

/// Frame size at which the detail proxy saturates.
const DETAIL_SATURATION_BYTES: f64 = 200.0 * 1024.0;

/// Always-available detail-proxy backend.
pub struct HeuristicDetector;

impl HeuristicDetector {
    /// Detail proxy in [0, 1] from the JPEG byte size.
    pub fn detail_score(size_bytes: u64) -> f64 {
        (size_bytes as f64 / DETAIL_SATURATION_BYTES).min(1.0)
    }
}

#[async_trait]
impl DetectionBackend for HeuristicDetector {
    async fn detect(&self, frame: &Frame) -> MediaResult<Vec<LabeledObject>> {
        let size = tokio::fs::metadata(&frame.path).await?.len();
        let detail = Self::detail_score(size);
        let label = if detail > 0.5 {
            "scene-rich"
        } else {
            "scene-simple"
        };
        Ok(vec![LabeledObject::new(label, detail)])
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn uses_ai(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_score_saturates() {
        assert_eq!(HeuristicDetector::detail_score(0), 0.0);
        assert!((HeuristicDetector::detail_score(100 * 1024) - 0.5).abs() < 0.001);
        assert_eq!(HeuristicDetector::detail_score(500 * 1024), 1.0);
    }

    #[tokio::test]
    async fn test_detect_labels_by_detail() {
        let dir = tempfile::tempdir().unwrap();

        let rich = dir.path().join("rich.jpg");
        std::fs::write(&rich, vec![0u8; 150 * 1024]).unwrap();
        let frame = Frame {
            timestamp: 1.0,
            path: rich,
        };
        let objects = HeuristicDetector.detect(&frame).await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].label, "scene-rich");
        assert!(objects[0].score > 0.5);

        let simple = dir.path().join("simple.jpg");
        std::fs::write(&simple, vec![0u8; 10 * 1024]).unwrap();
        let frame = Frame {
            timestamp: 2.0,
            path: simple,
        };
        let objects = HeuristicDetector.detect(&frame).await.unwrap();
        assert_eq!(objects[0].label, "scene-simple");
    }
}
