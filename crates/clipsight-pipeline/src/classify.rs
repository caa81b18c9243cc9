//! Content classification cascade.
//!
//! Three tiers, tried in order, each independent and final once reached:
//! 1. Remote reasoning over aggregated detection statistics
//! 2. Zero-shot frame scoring against a fixed content label set
//! 3. Object-count heuristics (always available, terminal)
//!
//! Any tier failure falls through silently; nothing here can fail the
//! analysis.

use std::collections::BTreeMap;

use metrics::counter;
use tracing::{debug, info};

use clipsight_media::detect::ImageLabeler;
use clipsight_media::Frame;
use clipsight_models::{Classification, ContentType, FrameDetections, VideoMetadata};

use crate::llm::{DetectionSummary, LlmClient, Platform};

/// Fixed label set for the zero-shot tier.
pub const CONTENT_LABELS: [&str; 5] = [
    "gameplay",
    "tutorial",
    "vlog",
    "screen recording",
    "non-game",
];

/// Zero-shot confidence boost reflecting cross-frame aggregation, capped
/// to avoid false certainty.
const AGGREGATION_BOOST: f64 = 0.2;
const ZERO_SHOT_CONFIDENCE_CAP: f64 = 0.98;

/// Labels strongly associated with game footage.
const GAMEPLAY_LABELS: [&str; 8] = [
    "sports ball",
    "car",
    "motorcycle",
    "skateboard",
    "kite",
    "snowboard",
    "surfboard",
    "tennis racket",
];

/// Screen/UI hardware labels.
const SCREEN_UI_LABELS: [&str; 5] = ["tv", "laptop", "keyboard", "mouse", "cell phone"];

const PERSON_LABELS: [&str; 1] = ["person"];
const READING_LABELS: [&str; 1] = ["book"];

/// The cascade, assembled once per analyzer.
pub struct ContentClassifier {
    llm: Option<LlmClient>,
    zero_shot: Option<ImageLabeler>,
}

impl ContentClassifier {
    pub fn new(llm: Option<LlmClient>, zero_shot: Option<ImageLabeler>) -> Self {
        Self { llm, zero_shot }
    }

    /// Run the cascade. Always produces a verdict.
    pub async fn classify(
        &self,
        detections: &[FrameDetections],
        frames: &[Frame],
        metadata: &VideoMetadata,
    ) -> Classification {
        if let Some(llm) = &self.llm {
            let summary = DetectionSummary::from_detections(detections);
            if let Some(remote) = llm.classify(&summary, metadata).await {
                let mut classification = remote.classification;
                if remote.platform != Platform::Unknown {
                    classification
                        .reasons
                        .push(format!("platform hint: {}", remote.platform.as_str()));
                }
                info!(
                    content_type = classification.content_type.as_str(),
                    confidence = classification.confidence,
                    "Remote classification used"
                );
                counter!("clipsight_classification_total", "tier" => "remote").increment(1);
                return classification;
            }
            debug!("Remote classification unavailable, trying zero-shot tier");
        }

        if let Some(labeler) = &self.zero_shot {
            if let Some(classification) = zero_shot_classification(labeler, frames) {
                info!(
                    content_type = classification.content_type.as_str(),
                    confidence = classification.confidence,
                    "Zero-shot classification used"
                );
                counter!("clipsight_classification_total", "tier" => "zero_shot").increment(1);
                return classification;
            }
            debug!("Zero-shot classification unavailable, using heuristic tier");
        }

        counter!("clipsight_classification_total", "tier" => "heuristic").increment(1);
        heuristic_classification(detections)
    }
}

/// Score every frame against the content label set and pick the label with
/// the largest normalized share. `None` (fall through) when there are no
/// frames, any frame fails to score, or no label gets any mass.
fn zero_shot_classification(labeler: &ImageLabeler, frames: &[Frame]) -> Option<Classification> {
    if frames.is_empty() {
        return None;
    }

    let mut aggregate: BTreeMap<&str, f64> =
        CONTENT_LABELS.iter().map(|l| (*l, 0.0)).collect();

    for frame in frames {
        let scored = labeler.scores(&frame.path).ok()?;
        for (label, score) in scored {
            if let Some(sum) = aggregate.get_mut(label.as_str()) {
                *sum += score;
            }
        }
    }

    let total: f64 = aggregate.values().sum();
    if total <= 0.0 {
        return None;
    }

    let (top_label, top_sum) = aggregate
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))?;
    let share = top_sum / total;

    Some(Classification::new(
        // "screen recording" maps to tutorial
        ContentType::from_label(top_label),
        clipsight_models::round2((share + AGGREGATION_BOOST).min(ZERO_SHOT_CONFIDENCE_CAP)),
        vec![format!("zero-shot top: {top_label} ({share:.2})")],
    ))
}

/// Terminal heuristic tier: a decision table over frame-level label counts,
/// evaluated top to bottom, first match wins.
pub fn heuristic_classification(detections: &[FrameDetections]) -> Classification {
    let mut gameplay_score = 0usize;
    let mut screen_frames = 0usize;
    let mut person_frames = 0usize;
    let mut reading_frames = 0usize;

    for frame in detections {
        if frame.contains_any(&PERSON_LABELS) {
            person_frames += 1;
        }
        if frame.contains_any(&SCREEN_UI_LABELS) {
            screen_frames += 1;
        }
        if frame.contains_any(&READING_LABELS) {
            reading_frames += 1;
        }
        if frame.contains_any(&GAMEPLAY_LABELS) {
            gameplay_score += 1;
        }
    }

    debug!(
        gameplay_score,
        screen_frames, person_frames, reading_frames, "Heuristic classification counts"
    );

    if gameplay_score >= 2 && screen_frames >= 1 {
        return Classification::new(
            ContentType::Gameplay,
            (0.6 + gameplay_score as f64 * 0.15).min(0.95),
            vec![
                "game-related objects".to_string(),
                "screen/UI elements detected".to_string(),
            ],
        );
    }

    if person_frames >= 2 && screen_frames >= 1 {
        return Classification::new(
            ContentType::Tutorial,
            (0.5 + person_frames as f64 * 0.1).min(0.9),
            vec![
                "person present".to_string(),
                "screen/UI elements likely instructional".to_string(),
            ],
        );
    }

    if person_frames >= 2 && screen_frames == 0 {
        return Classification::new(
            ContentType::Vlog,
            (0.5 + person_frames as f64 * 0.1).min(0.85),
            vec![
                "person present".to_string(),
                "no screen/UI typical of vlog".to_string(),
            ],
        );
    }

    Classification::unknown()
}
