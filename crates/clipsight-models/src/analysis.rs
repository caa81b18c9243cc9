//! The terminal analysis result aggregate.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::classification::ContentType;
use crate::detection::FrameDetections;
use crate::highlight::Highlight;
use crate::metadata::VideoMetadata;

/// Complete result of one video analysis.
///
/// Constructed once by the orchestrator and never mutated afterwards.
/// Field names (including the `detected_objects/scenes` key) follow the
/// persisted wire format consumed by the surrounding application.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Decided content type
    pub content_type: ContentType,

    /// Narrative summary of the clip
    pub content_summary: String,

    /// Classification confidence in [0, 1], rounded to two decimals
    pub analysis_confidence: f64,

    /// Key moments ordered by timestamp
    pub timestamped_highlights: Vec<Highlight>,

    /// Per-frame detections, ordered by timestamp; one entry per
    /// successfully sampled frame
    #[serde(rename = "detected_objects/scenes")]
    pub detections: Vec<FrameDetections>,

    /// Low-confidence and data-quality caveats, additive and non-fatal
    pub potential_misclassifications: Vec<String>,

    /// Probed technical metadata (fields null on probe failure)
    pub metadata: VideoMetadata,

    /// True when the anomaly heuristic flags the clip
    pub cheat_flag: bool,

    /// Composite anomaly score in [0, 1], rounded to three decimals.
    /// A heuristic indicator, not a validated cheat-detection signal.
    pub cheat_score: f64,

    /// Headshot-rate proxy in [0, 100], rounded to one decimal.
    /// Exactly 0 for non-gameplay content.
    pub headshot_rate: f64,

    /// At most four deduplicated coaching tips
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            content_type: ContentType::Gameplay,
            content_summary: "Analyzed 8 sampled frames over 180.0s. 3 key moments identified."
                .to_string(),
            analysis_confidence: 0.9,
            timestamped_highlights: vec![Highlight::new(20.0, "Detected sports ball", 0.91)],
            detections: vec![],
            potential_misclassifications: vec![],
            metadata: VideoMetadata {
                duration: Some(180.0),
                width: Some(1920),
                height: Some(1080),
                fps: Some(60.0),
            },
            cheat_flag: false,
            cheat_score: 0.1,
            headshot_rate: 18.2,
            recommendations: vec!["Work on crosshair placement: keep it at head level around corners.".to_string()],
        }
    }

    #[test]
    fn test_wire_key_for_detections() {
        let json = serde_json::to_value(sample_result()).unwrap();
        assert!(json.get("detected_objects/scenes").is_some());
        assert_eq!(json["content_type"], "gameplay");
        assert_eq!(json["headshot_rate"], 18.2);
    }

    #[test]
    fn test_round_trip() {
        let json = serde_json::to_string(&sample_result()).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content_type, ContentType::Gameplay);
        assert_eq!(back.timestamped_highlights.len(), 1);
        assert!(!back.cheat_flag);
    }
}
