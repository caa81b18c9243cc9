//! Coaching recommendations derived from content type and capture quality.

use clipsight_models::{ContentType, VideoMetadata};

/// Hard cap on the recommendation list, applied after deduplication.
pub const MAX_RECOMMENDATIONS: usize = 4;

/// Width below which a capture-resolution tip is added.
const RECOMMENDED_MIN_WIDTH: u32 = 1280;

/// Frame rate below which a capture-FPS tip is added.
const RECOMMENDED_MIN_FPS: f64 = 50.0;

const GAMEPLAY_TIPS: [&str; 3] = [
    "Work on crosshair placement: keep it at head level around corners.",
    "Improve recoil control: fire in controlled bursts and reset aim between sprays.",
    "Positioning matters: use cover and off-angles to take favorable fights.",
];

const TUTORIAL_TIPS: [&str; 2] = [
    "Follow along with drills and pause to practice each step.",
    "Record your own attempts to compare against the tutorial progress.",
];

const GENERIC_TIP: &str =
    "Focus on fundamentals: aim training, movement drills, and decision-making.";

/// Base recommendation list for a classified clip.
pub fn recommendations(content_type: ContentType, metadata: &VideoMetadata) -> Vec<String> {
    let mut tips: Vec<String> = match content_type {
        ContentType::Gameplay => GAMEPLAY_TIPS.iter().map(|t| t.to_string()).collect(),
        ContentType::Tutorial => TUTORIAL_TIPS.iter().map(|t| t.to_string()).collect(),
        _ => vec![GENERIC_TIP.to_string()],
    };

    if metadata.width.is_some_and(|w| w < RECOMMENDED_MIN_WIDTH) {
        tips.push(
            "Consider recording at 1280x720 or higher for clearer review of micro-adjustments."
                .to_string(),
        );
    }
    if metadata.fps.is_some_and(|f| f < RECOMMENDED_MIN_FPS) {
        tips.push(
            "Higher FPS (60+) improves motion clarity; adjust game and capture settings."
                .to_string(),
        );
    }

    truncate_deduped(tips)
}

/// Merge extra tips (e.g. from the remote refinement pass) into the base
/// list, preserving order, dropping exact duplicates, capped at
/// [`MAX_RECOMMENDATIONS`].
pub fn merge_tips(base: Vec<String>, extra: Vec<String>) -> Vec<String> {
    let mut merged = base;
    merged.extend(extra);
    truncate_deduped(merged)
}

fn truncate_deduped(tips: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tips.len().min(MAX_RECOMMENDATIONS));
    for tip in tips {
        if !seen.contains(&tip) {
            seen.push(tip);
            if seen.len() == MAX_RECOMMENDATIONS {
                break;
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hd_metadata() -> VideoMetadata {
        VideoMetadata {
            duration: Some(60.0),
            width: Some(1920),
            height: Some(1080),
            fps: Some(60.0),
        }
    }

    #[test]
    fn test_gameplay_tips() {
        let tips = recommendations(ContentType::Gameplay, &hd_metadata());
        assert_eq!(tips.len(), 3);
        assert!(tips[0].contains("crosshair placement"));
    }

    #[test]
    fn test_generic_tip_for_other_content() {
        let tips = recommendations(ContentType::Vlog, &hd_metadata());
        assert_eq!(tips, vec![GENERIC_TIP.to_string()]);
    }

    #[test]
    fn test_quality_tips_appended_and_capped() {
        // Gameplay tips (3) + resolution + fps would be 5; the cap keeps 4
        let metadata = VideoMetadata {
            duration: Some(60.0),
            width: Some(854),
            height: Some(480),
            fps: Some(30.0),
        };
        let tips = recommendations(ContentType::Gameplay, &metadata);
        assert_eq!(tips.len(), MAX_RECOMMENDATIONS);
        assert!(tips[3].contains("1280x720"));
    }

    #[test]
    fn test_missing_metadata_adds_no_quality_tips() {
        let tips = recommendations(ContentType::Tutorial, &VideoMetadata::unavailable());
        assert_eq!(tips.len(), 2);
    }

    #[test]
    fn test_merge_dedupes_and_preserves_order() {
        let base = vec!["a".to_string(), "b".to_string()];
        let extra = vec!["b".to_string(), "c".to_string(), "a".to_string()];
        assert_eq!(
            merge_tips(base, extra),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_merge_respects_cap() {
        let base = vec!["1".to_string(), "2".to_string(), "3".to_string()];
        let extra = vec!["4".to_string(), "5".to_string()];
        let merged = merge_tips(base, extra);
        assert_eq!(merged.len(), MAX_RECOMMENDATIONS);
        assert_eq!(merged.last().map(String::as_str), Some("4"));
    }
}
