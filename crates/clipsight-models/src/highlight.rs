//! Timestamped clip highlights.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A key moment in the clip, derived from a strong frame detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Highlight {
    /// Timestamp in seconds
    #[serde(rename = "t")]
    pub timestamp: f64,
    /// Short description of the moment (e.g. "Detected person")
    pub label: String,
    /// Confidence of the underlying detection in [0, 1]
    pub confidence: f64,
}

impl Highlight {
    /// Create a highlight with presentation rounding applied (two decimals).
    pub fn new(timestamp: f64, label: impl Into<String>, confidence: f64) -> Self {
        Self {
            timestamp: crate::utils::round2(timestamp),
            label: label.into(),
            confidence: crate::utils::round2(crate::utils::clamp_unit(confidence)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rounds() {
        let h = Highlight::new(12.3456, "Detected person", 0.876543);
        assert_eq!(h.timestamp, 12.35);
        assert_eq!(h.confidence, 0.88);
        assert_eq!(h.label, "Detected person");
    }
}
