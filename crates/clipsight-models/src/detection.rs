//! Per-frame object/scene detections.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single labeled recognition with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LabeledObject {
    /// Object/scene label (e.g. "person", "keyboard", "scene-rich")
    #[serde(rename = "name")]
    pub label: String,
    /// Detection confidence in [0, 1]
    pub score: f64,
}

impl LabeledObject {
    /// Create a labeled object, clamping the score to [0, 1].
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score: crate::utils::clamp_unit(score),
        }
    }
}

/// All detections for one sampled frame.
///
/// The `objects` sequence is ordered by descending score. Frame sequences
/// are ordered by timestamp; ordering matters for highlight sequencing and
/// consistency-ratio computations downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameDetections {
    /// Timestamp of the sampled frame in seconds
    #[serde(rename = "t")]
    pub timestamp: f64,
    /// Detected objects, best score first. Empty is valid (nothing found).
    pub objects: Vec<LabeledObject>,
}

impl FrameDetections {
    /// Create an empty detection record for a frame.
    pub fn empty(timestamp: f64) -> Self {
        Self {
            timestamp,
            objects: Vec::new(),
        }
    }

    /// The highest-scoring detection, if any.
    pub fn top(&self) -> Option<&LabeledObject> {
        self.objects
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// True if any detected label is in `labels`.
    pub fn contains_any(&self, labels: &[&str]) -> bool {
        self.objects
            .iter()
            .any(|o| labels.contains(&o.label.as_str()))
    }

    /// True if any detection scores above `cutoff`.
    pub fn any_above(&self, cutoff: f64) -> bool {
        self.objects.iter().any(|o| o.score > cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_score() {
        assert_eq!(LabeledObject::new("person", 1.7).score, 1.0);
        assert_eq!(LabeledObject::new("person", -0.2).score, 0.0);
    }

    #[test]
    fn test_top_picks_best() {
        let frame = FrameDetections {
            timestamp: 4.0,
            objects: vec![
                LabeledObject::new("tv", 0.4),
                LabeledObject::new("person", 0.9),
            ],
        };
        assert_eq!(frame.top().unwrap().label, "person");
    }

    #[test]
    fn test_contains_any() {
        let frame = FrameDetections {
            timestamp: 1.0,
            objects: vec![LabeledObject::new("keyboard", 0.7)],
        };
        assert!(frame.contains_any(&["tv", "keyboard"]));
        assert!(!frame.contains_any(&["person"]));
        assert!(!FrameDetections::empty(0.0).contains_any(&["person"]));
    }

    #[test]
    fn test_wire_field_names() {
        let frame = FrameDetections {
            timestamp: 2.5,
            objects: vec![LabeledObject::new("car", 0.8)],
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["t"], 2.5);
        assert_eq!(json["objects"][0]["name"], "car");
    }
}
