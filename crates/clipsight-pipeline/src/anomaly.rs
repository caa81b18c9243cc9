//! Anomaly scoring: headshot-rate proxy and composite cheat score.
//!
//! The headshot rate is a labeled heuristic derived from detection
//! confidence distributions, not a validated cheat-detection signal. Where
//! real evidence is missing it substitutes placeholder noise rather than
//! reading as "clean"; all randomness sits behind [`NoiseSource`] so tests
//! can pin it.

use rand::Rng;

use clipsight_models::{clamp_rate, round1, round3, Classification, FrameDetections};

use crate::config::ScoringConfig;

/// Detection score above which a frame counts toward the consistency
/// ("inhuman precision") check.
const HIGH_CONFIDENCE_CUTOFF: f64 = 0.9;

/// Upper bound (exclusive) of the undefined-evidence placeholder rate.
const UNDEFINED_EVIDENCE_MAX_RATE: f64 = 40.0;

/// Half-width of the variance perturbation applied to evidence-based rates.
const RATE_VARIANCE: f64 = 5.0;

/// Injectable randomness source for the placeholder signals.
pub trait NoiseSource: Send {
    /// A value uniformly distributed in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;
}

/// Default noise source backed by the thread RNG.
#[derive(Debug, Default)]
pub struct ThreadRngNoise;

impl NoiseSource for ThreadRngNoise {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        rand::rng().random_range(lo..hi)
    }
}

/// Deterministic noise for tests: always yields the stored value, clamped
/// into the requested range.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub f64);

impl NoiseSource for FixedNoise {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        self.0.clamp(lo, hi)
    }
}

/// Composite anomaly verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyVerdict {
    /// Score in [0, 1], rounded to three decimals
    pub score: f64,
    /// Disjunctive flag: high rate alone triggers it even when the
    /// additive score stays low
    pub flagged: bool,
}

/// Headshot-rate proxy in [0, 100], rounded to one decimal.
///
/// Defined only for gameplay content; deterministically 0 otherwise (the
/// gameplay gate takes precedence over the undefined-evidence fallback).
pub fn headshot_rate(
    detections: &[FrameDetections],
    classification: &Classification,
    config: &ScoringConfig,
    noise: &mut dyn NoiseSource,
) -> f64 {
    if !classification.is_gameplay() {
        return 0.0;
    }

    let mut headshot_indicators = 0usize;
    let mut total_shot_indicators = 0usize;

    for frame in detections {
        for object in &frame.objects {
            if object.score > config.high_precision_cutoff {
                headshot_indicators += 1;
                total_shot_indicators += 1;
            } else if object.score > config.medium_precision_cutoff {
                total_shot_indicators += 1;
            }
        }
    }

    if total_shot_indicators == 0 {
        // No evidence either way: a placeholder draw, deliberately not 0
        return round1(noise.uniform(0.0, UNDEFINED_EVIDENCE_MAX_RATE));
    }

    let base_rate = 100.0 * headshot_indicators as f64 / total_shot_indicators as f64;
    let variance = noise.uniform(-RATE_VARIANCE, RATE_VARIANCE);
    round1(clamp_rate(base_rate + variance))
}

/// Composite anomaly score and flag from the additive threshold table.
pub fn anomaly_score(
    detections: &[FrameDetections],
    classification: &Classification,
    headshot_rate: f64,
    config: &ScoringConfig,
) -> AnomalyVerdict {
    let mut score: f64 = 0.0;

    if headshot_rate > config.rate_alert_threshold {
        score += 0.8;
        if headshot_rate > config.rate_extreme_threshold {
            score += 0.2;
        }
    }

    if classification.is_gameplay() && classification.confidence > 0.8 {
        score += 0.1;
    }

    let high_confidence_frames = detections
        .iter()
        .filter(|d| d.any_above(HIGH_CONFIDENCE_CUTOFF))
        .count();
    let consistency_ratio = high_confidence_frames as f64 / detections.len().max(1) as f64;

    if consistency_ratio > config.consistency_ratio_threshold
        && headshot_rate > config.rate_consistency_threshold
    {
        score += 0.1;
    }

    let score = round3(score.min(1.0));
    let flagged = headshot_rate > config.rate_alert_threshold || score > config.flag_score_threshold;

    AnomalyVerdict { score, flagged }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsight_models::{ContentType, LabeledObject};

    fn gameplay(confidence: f64) -> Classification {
        Classification::new(ContentType::Gameplay, confidence, vec![])
    }

    fn frame(t: f64, scores: &[f64]) -> FrameDetections {
        FrameDetections {
            timestamp: t,
            objects: scores
                .iter()
                .map(|s| LabeledObject::new("person", *s))
                .collect(),
        }
    }

    #[test]
    fn test_gameplay_gate_takes_precedence() {
        // Non-gameplay must be exactly 0, never the placeholder draw,
        // even with zero evidence.
        let classification = Classification::unknown();
        let rate = headshot_rate(
            &[],
            &classification,
            &ScoringConfig::default(),
            &mut FixedNoise(33.0),
        );
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn test_undefined_evidence_placeholder() {
        // Gameplay with no shot indicators falls back to the [0, 40) draw
        let detections = vec![frame(1.0, &[0.5, 0.3])];
        let rate = headshot_rate(
            &detections,
            &gameplay(0.9),
            &ScoringConfig::default(),
            &mut FixedNoise(17.0),
        );
        assert_eq!(rate, 17.0);
    }

    #[test]
    fn test_rate_from_evidence() {
        // One high-precision + one medium-precision detection: 50%
        let detections = vec![frame(1.0, &[0.9, 0.7])];
        let rate = headshot_rate(
            &detections,
            &gameplay(0.9),
            &ScoringConfig::default(),
            &mut FixedNoise(0.0),
        );
        assert_eq!(rate, 50.0);
    }

    #[test]
    fn test_rate_clamped_to_100() {
        let detections = vec![frame(1.0, &[0.95]), frame(2.0, &[0.99])];
        let rate = headshot_rate(
            &detections,
            &gameplay(0.9),
            &ScoringConfig::default(),
            &mut FixedNoise(5.0),
        );
        assert_eq!(rate, 100.0);
    }

    #[test]
    fn test_rate_always_in_range() {
        let detections = vec![frame(1.0, &[0.7])]; // 0% base rate
        let rate = headshot_rate(
            &detections,
            &gameplay(0.9),
            &ScoringConfig::default(),
            &mut FixedNoise(-5.0),
        );
        assert!((0.0..=100.0).contains(&rate));
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn test_score_ladder() {
        let config = ScoringConfig::default();
        let low = anomaly_score(&[], &gameplay(0.5), 10.0, &config);
        assert_eq!(low.score, 0.0);
        assert!(!low.flagged);

        let alert = anomaly_score(&[], &gameplay(0.5), 30.0, &config);
        assert_eq!(alert.score, 0.8);
        assert!(alert.flagged);

        let extreme = anomaly_score(&[], &gameplay(0.5), 45.0, &config);
        assert_eq!(extreme.score, 1.0);
        assert!(extreme.flagged);
    }

    #[test]
    fn test_confident_gameplay_term() {
        let verdict = anomaly_score(&[], &gameplay(0.9), 10.0, &ScoringConfig::default());
        assert_eq!(verdict.score, 0.1);
        assert!(!verdict.flagged);
    }

    #[test]
    fn test_consistency_term() {
        // All frames carry a >0.9 detection and the rate is above 20:
        // the uniform-precision term applies.
        let detections: Vec<FrameDetections> =
            (0..5).map(|i| frame(i as f64, &[0.95])).collect();
        let verdict = anomaly_score(&detections, &gameplay(0.7), 22.0, &ScoringConfig::default());
        assert_eq!(verdict.score, 0.1);
        assert!(!verdict.flagged);
    }

    #[test]
    fn test_flag_disjunction_law() {
        // Rate above 25 flags the clip regardless of the additive score
        let config = ScoringConfig::default();
        let verdict = anomaly_score(&[], &Classification::unknown(), 26.0, &config);
        assert!(verdict.flagged);
        assert!(verdict.score <= config.flag_score_threshold + 0.8);

        // And a capped score cannot mask the rate trigger
        let verdict = anomaly_score(&[], &gameplay(0.5), 25.1, &config);
        assert!(verdict.flagged);
    }

    #[test]
    fn test_score_capped_at_one() {
        let detections: Vec<FrameDetections> =
            (0..5).map(|i| frame(i as f64, &[0.95])).collect();
        let verdict = anomaly_score(&detections, &gameplay(0.95), 50.0, &ScoringConfig::default());
        assert_eq!(verdict.score, 1.0);
        assert!(verdict.flagged);
    }
}
