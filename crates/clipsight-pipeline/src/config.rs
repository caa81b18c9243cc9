//! Pipeline configuration.
//!
//! All environment-derived settings are read once into an explicit struct
//! handed to the orchestrator at construction time; pipeline stages never
//! read the environment themselves.

use clipsight_media::DetectorConfig;

/// Remote reasoning (OpenRouter) configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key; `None` disables the remote tiers entirely
    pub api_key: Option<String>,
    /// Model slug passed to the chat completions endpoint
    pub model: String,
    /// API base URL (overridable for tests)
    pub base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "openrouter/auto".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
        }
    }
}

/// Anomaly scorer thresholds.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Detection score above which a detection counts as high-precision
    pub high_precision_cutoff: f64,
    /// Detection score above which a detection counts as medium-precision
    pub medium_precision_cutoff: f64,
    /// Headshot rate above which the primary anomaly term applies
    pub rate_alert_threshold: f64,
    /// Headshot rate above which the extreme-rate term applies
    pub rate_extreme_threshold: f64,
    /// Headshot rate above which the consistency term may apply
    pub rate_consistency_threshold: f64,
    /// Fraction of high-confidence frames above which precision is
    /// considered suspiciously uniform
    pub consistency_ratio_threshold: f64,
    /// Composite score above which the flag is raised regardless of rate
    pub flag_score_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            high_precision_cutoff: 0.85,
            medium_precision_cutoff: 0.6,
            rate_alert_threshold: 25.0,
            rate_extreme_threshold: 40.0,
            rate_consistency_threshold: 20.0,
            consistency_ratio_threshold: 0.8,
            flag_score_threshold: 0.7,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Target number of frames to sample
    pub frame_count: usize,
    /// Bounded concurrency for frame extraction and detection
    pub max_parallel: usize,
    /// Object-detection backend configuration
    pub detector: DetectorConfig,
    /// Path to the content-type ONNX classifier (zero-shot tier)
    pub content_model_path: String,
    /// Path to its sidecar label list
    pub content_labels_path: String,
    /// Remote reasoning configuration
    pub llm: LlmConfig,
    /// Anomaly scorer thresholds
    pub scoring: ScoringConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_count: 10,
            max_parallel: 4,
            detector: DetectorConfig::default(),
            content_model_path: "models/content/content.onnx".to_string(),
            content_labels_path: "models/content/content_labels.txt".to_string(),
            llm: LlmConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            frame_count: std::env::var("CLIPSIGHT_FRAME_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frame_count),
            max_parallel: std::env::var("CLIPSIGHT_MAX_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_parallel),
            detector: DetectorConfig {
                model_path: std::env::var("CLIPSIGHT_DETECT_MODEL")
                    .unwrap_or(defaults.detector.model_path),
                labeler_model_path: std::env::var("CLIPSIGHT_LABELER_MODEL")
                    .unwrap_or(defaults.detector.labeler_model_path),
                labeler_labels_path: std::env::var("CLIPSIGHT_LABELER_LABELS")
                    .unwrap_or(defaults.detector.labeler_labels_path),
                ..defaults.detector
            },
            content_model_path: std::env::var("CLIPSIGHT_CONTENT_MODEL")
                .unwrap_or(defaults.content_model_path),
            content_labels_path: std::env::var("CLIPSIGHT_CONTENT_LABELS")
                .unwrap_or(defaults.content_labels_path),
            llm: LlmConfig {
                api_key: std::env::var("OPENROUTER_API_KEY").ok().filter(|k| !k.is_empty()),
                model: std::env::var("OPENROUTER_MODEL")
                    .unwrap_or(defaults.llm.model),
                base_url: std::env::var("OPENROUTER_BASE_URL")
                    .unwrap_or(defaults.llm.base_url),
            },
            scoring: defaults.scoring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.frame_count, 10);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.llm.model, "openrouter/auto");
        assert!((config.scoring.rate_alert_threshold - 25.0).abs() < f64::EPSILON);
        assert!((config.scoring.flag_score_threshold - 0.7).abs() < f64::EPSILON);
    }
}
