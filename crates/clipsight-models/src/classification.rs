//! Content classification verdicts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The content type of an analyzed clip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    /// Game footage (the only type for which headshot-rate is computed)
    Gameplay,
    /// Instructional content, including screen recordings
    Tutorial,
    /// Camera-facing talking content
    Vlog,
    /// Content that is clearly not game-related
    NonGame,
    /// Not enough evidence to decide
    #[default]
    Unknown,
}

impl ContentType {
    /// Returns the content type as a string for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gameplay => "gameplay",
            Self::Tutorial => "tutorial",
            Self::Vlog => "vlog",
            Self::NonGame => "non-game",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a free-form label leniently.
    ///
    /// "screen recording" maps to `Tutorial`; anything unrecognized maps
    /// to `Unknown` rather than failing.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "gameplay" => Self::Gameplay,
            "tutorial" | "screen recording" => Self::Tutorial,
            "vlog" => Self::Vlog,
            "non-game" | "nongame" => Self::NonGame,
            _ => Self::Unknown,
        }
    }
}

/// A single content-type verdict with confidence and rationale.
///
/// Produced once per analysis and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Classification {
    /// The decided content type
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Human-readable rationale fragments
    pub reasons: Vec<String>,
}

impl Classification {
    /// Create a classification, clamping confidence to [0, 1].
    pub fn new(content_type: ContentType, confidence: f64, reasons: Vec<String>) -> Self {
        Self {
            content_type,
            confidence: crate::utils::clamp_unit(confidence),
            reasons,
        }
    }

    /// The terminal low-evidence verdict.
    pub fn unknown() -> Self {
        Self::new(
            ContentType::Unknown,
            0.4,
            vec!["insufficient evidence for classification".to_string()],
        )
    }

    /// True for gameplay verdicts.
    pub fn is_gameplay(&self) -> bool {
        self.content_type == ContentType::Gameplay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_mapping() {
        assert_eq!(ContentType::from_label("gameplay"), ContentType::Gameplay);
        assert_eq!(
            ContentType::from_label("screen recording"),
            ContentType::Tutorial
        );
        assert_eq!(ContentType::from_label("Non-Game"), ContentType::NonGame);
        assert_eq!(ContentType::from_label("dance video"), ContentType::Unknown);
        assert_eq!(ContentType::from_label(" VLOG "), ContentType::Vlog);
    }

    #[test]
    fn test_wire_spelling() {
        let json = serde_json::to_value(ContentType::NonGame).unwrap();
        assert_eq!(json, "non-game");
        let parsed: ContentType = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, ContentType::NonGame);
    }

    #[test]
    fn test_new_clamps_confidence() {
        let c = Classification::new(ContentType::Gameplay, 1.4, vec![]);
        assert_eq!(c.confidence, 1.0);
        assert!(c.is_gameplay());
    }

    #[test]
    fn test_unknown_verdict() {
        let c = Classification::unknown();
        assert_eq!(c.content_type, ContentType::Unknown);
        assert!((c.confidence - 0.4).abs() < f64::EPSILON);
        assert_eq!(c.reasons.len(), 1);
    }
}
