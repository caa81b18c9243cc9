//! The analysis orchestrator.
//!
//! Owns the fixed stage order and the degradation policy: only source
//! acquisition can fail an analysis, every later stage falls back to its
//! documented substitute and the run still produces a complete result.

use std::sync::Mutex;

use metrics::counter;
use tracing::{info, instrument, warn};

use clipsight_media::detect::ImageLabeler;
use clipsight_media::{
    detect_batch, probe_metadata, sample_frames, select_backend, SamplerConfig, VideoSource,
};
use clipsight_models::{round2, AnalysisResult, Classification};

use crate::anomaly::{self, NoiseSource, ThreadRngNoise};
use crate::classify::{ContentClassifier, CONTENT_LABELS};
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::llm::{LlmClient, SummaryRequest};
use crate::recommend::{self, merge_tips};
use crate::summary::{compose_summary, quality_caveats};

/// Classification confidence below which a low-confidence warning is
/// prepended to the misclassification list.
const LOW_CONFIDENCE_CUTOFF: f64 = 0.6;

/// One-call video analysis pipeline.
pub struct Analyzer {
    config: PipelineConfig,
    llm: Option<LlmClient>,
    noise: Mutex<Box<dyn NoiseSource>>,
}

impl Analyzer {
    pub fn new(config: PipelineConfig) -> Self {
        let llm = LlmClient::from_config(&config.llm);
        if llm.is_none() {
            info!("No remote API key configured, remote tiers disabled");
        }
        Self {
            config,
            llm,
            noise: Mutex::new(Box::new(ThreadRngNoise)),
        }
    }

    /// Replace the randomness source. Used by tests to pin the placeholder
    /// signals.
    pub fn with_noise(mut self, noise: Box<dyn NoiseSource>) -> Self {
        self.noise = Mutex::new(noise);
        self
    }

    /// Analyze one video source end to end.
    #[instrument(skip(self))]
    pub async fn analyze(&self, source: &VideoSource) -> PipelineResult<AnalysisResult> {
        counter!("clipsight_analyses_started_total").increment(1);

        // The only fatal stage
        let video = source.fetch().await?;

        let metadata = probe_metadata(video.path()).await;

        let sampler = SamplerConfig {
            frame_count: self.config.frame_count,
            max_parallel: self.config.max_parallel,
        };
        let batch = sample_frames(video.path(), metadata.positive_duration(), &sampler).await?;
        if batch.is_empty() {
            warn!("No frames sampled, analysis will rely on metadata and fallbacks");
        }

        let backend = select_backend(&self.config.detector);
        let detections = detect_batch(backend, batch.frames(), self.config.max_parallel).await;

        let classifier = ContentClassifier::new(self.llm.clone(), self.content_labeler());
        let classification = classifier
            .classify(&detections, batch.frames(), &metadata)
            .await;

        // Frame files are no longer needed past classification
        drop(batch);

        let summary = compose_summary(&detections, metadata.positive_duration());
        let caveats = quality_caveats(classification.content_type, &metadata);

        let rate = {
            let mut noise = match self.noise.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            anomaly::headshot_rate(
                &detections,
                &classification,
                &self.config.scoring,
                noise.as_mut(),
            )
        };
        let verdict =
            anomaly::anomaly_score(&detections, &classification, rate, &self.config.scoring);

        let mut narrative = summary.narrative;
        let mut tips = recommend::recommendations(classification.content_type, &metadata);

        if let Some(llm) = &self.llm {
            let request = SummaryRequest {
                classification: &classification,
                metadata: &metadata,
                highlights: &summary.highlights,
                headshot_rate: rate,
                base_summary: &narrative,
            };
            if let Some(polish) = llm.refine_summary(&request).await {
                if let Some(refined) = polish.summary {
                    narrative = refined;
                }
                if let Some(extra) = polish.tips {
                    tips = merge_tips(tips, extra);
                }
            }
        }

        let result = AnalysisResult {
            content_type: classification.content_type,
            analysis_confidence: round2(classification.confidence),
            potential_misclassifications: potential_misclassifications(&classification, caveats),
            content_summary: narrative,
            timestamped_highlights: summary.highlights,
            detections,
            metadata,
            cheat_flag: verdict.flagged,
            cheat_score: verdict.score,
            headshot_rate: rate,
            recommendations: tips,
        };

        info!(
            content_type = result.content_type.as_str(),
            confidence = result.analysis_confidence,
            cheat_flag = result.cheat_flag,
            headshot_rate = result.headshot_rate,
            "Analysis complete"
        );
        counter!("clipsight_analyses_completed_total").increment(1);

        Ok(result)
    }

    /// Load the content-type classifier for the zero-shot tier, if its
    /// model files are present.
    fn content_labeler(&self) -> Option<ImageLabeler> {
        match ImageLabeler::load(
            &self.config.content_model_path,
            &self.config.content_labels_path,
            self.config.detector.input_size,
            CONTENT_LABELS.len(),
        ) {
            Ok(labeler) => Some(labeler),
            Err(e) => {
                warn!(error = %e, "Content classifier model unavailable, zero-shot tier disabled");
                None
            }
        }
    }
}

/// Low-confidence warning (first, when applicable) followed by the
/// metadata-quality caveats.
pub fn potential_misclassifications(
    classification: &Classification,
    caveats: Vec<String>,
) -> Vec<String> {
    let mut warnings = Vec::with_capacity(caveats.len() + 1);
    if classification.confidence < LOW_CONFIDENCE_CUTOFF {
        warnings.push("Low confidence due to limited evidence".to_string());
    }
    warnings.extend(caveats);
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsight_models::ContentType;

    #[test]
    fn test_low_confidence_warning_comes_first() {
        let classification = Classification::unknown(); // confidence 0.4
        let warnings = potential_misclassifications(
            &classification,
            vec!["Low resolution may reduce detection accuracy".to_string()],
        );
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0], "Low confidence due to limited evidence");
    }

    #[test]
    fn test_confident_classification_keeps_only_caveats() {
        let classification = Classification::new(ContentType::Gameplay, 0.9, vec![]);
        let warnings = potential_misclassifications(&classification, vec![]);
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_the_only_error_path() {
        let analyzer = Analyzer::new(PipelineConfig::default());
        let source = VideoSource::parse("/nonexistent/clip.mp4");
        assert!(analyzer.analyze(&source).await.is_err());
    }
}
