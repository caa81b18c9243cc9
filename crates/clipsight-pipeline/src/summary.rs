//! Summary composition and metadata-quality caveats.

use clipsight_models::{ContentType, FrameDetections, Highlight, VideoMetadata};

/// Detection score a frame's best object must exceed to become a highlight.
const HIGHLIGHT_CUTOFF: f64 = 0.6;

/// Minimum duration (seconds) below which classification gets a caveat.
const SHORT_DURATION_SECONDS: f64 = 10.0;

/// Minimum width (pixels) below which detection gets a caveat.
const LOW_RESOLUTION_WIDTH: u32 = 640;

/// Deterministic narrative plus per-frame highlights.
#[derive(Debug, Clone)]
pub struct ClipSummary {
    pub narrative: String,
    pub highlights: Vec<Highlight>,
}

/// Build the deterministic summary: one highlight per frame whose best
/// detection clears the cutoff, and a one-line narrative over the counts.
pub fn compose_summary(detections: &[FrameDetections], duration: Option<f64>) -> ClipSummary {
    let highlights: Vec<Highlight> = detections
        .iter()
        .filter_map(|frame| {
            frame.top().and_then(|object| {
                (object.score > HIGHLIGHT_CUTOFF).then(|| {
                    Highlight::new(
                        frame.timestamp,
                        format!("Detected {}", object.label),
                        object.score,
                    )
                })
            })
        })
        .collect();

    let span = match duration {
        Some(d) if d > 0.0 => format!(" over {d:.1}s"),
        _ => String::new(),
    };
    let narrative = format!(
        "Analyzed {} sampled frames{span}. {} key moments identified.",
        detections.len(),
        highlights.len()
    );

    ClipSummary {
        narrative,
        highlights,
    }
}

/// Metadata-quality caveats appended to the misclassification warnings.
///
/// A missing field fails its check: an unreadable clip gets both the
/// short-duration and low-resolution caveats, not a clean bill.
pub fn quality_caveats(content_type: ContentType, metadata: &VideoMetadata) -> Vec<String> {
    let mut caveats = Vec::new();

    if !matches!(metadata.duration, Some(d) if d >= SHORT_DURATION_SECONDS) {
        caveats.push("Very short duration may cause misclassification".to_string());
    }

    let resolution_ok =
        matches!(metadata.width, Some(w) if w >= LOW_RESOLUTION_WIDTH) && metadata.height.is_some();
    if !resolution_ok {
        caveats.push("Low resolution may reduce detection accuracy".to_string());
    }

    if content_type == ContentType::Gameplay && !metadata.has_resolution() {
        caveats.push(
            "Missing resolution reduces confidence for gameplay classification".to_string(),
        );
    }

    caveats
}
