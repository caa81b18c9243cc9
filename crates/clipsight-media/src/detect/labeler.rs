//! Zero-shot image labeling via a fixed-head ONNX classifier.
//!
//! A general image-classification model with a sidecar label list. Doubles
//! as the second object-detection tier (reporting its top-k labels as
//! detections) and as the frame scorer for the zero-shot content
//! classification tier.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;

use clipsight_models::LabeledObject;

use crate::error::{MediaError, MediaResult};
use crate::sampler::Frame;

use super::{image_to_chw_tensor, DetectionBackend};

/// Image classifier with a fixed label head.
///
/// Availability requires both the model and its label file to exist; the
/// label file holds one label per line in output-index order.
pub struct ImageLabeler {
    session: Mutex<Session>,
    labels: Vec<String>,
    input_size: u32,
    top_k: usize,
}

impl ImageLabeler {
    /// Load the classifier and its label list.
    pub fn load(
        model_path: &str,
        labels_path: &str,
        input_size: u32,
        top_k: usize,
    ) -> MediaResult<Self> {
        if !Path::new(model_path).exists() {
            return Err(MediaError::model_not_found(model_path));
        }

        let labels: Vec<String> = std::fs::read_to_string(labels_path)
            .map_err(|_| MediaError::model_not_found(labels_path))?
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        if labels.is_empty() {
            return Err(MediaError::internal(format!(
                "Label file {labels_path} is empty"
            )));
        }

        let model_bytes = std::fs::read(model_path)
            .map_err(|e| MediaError::internal(format!("Failed to read model file: {e}")))?;

        let session = Session::builder()
            .map_err(|e| MediaError::internal(format!("Failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| MediaError::internal(format!("Failed to set optimization level: {e}")))?
            .commit_from_memory(&model_bytes)
            .map_err(|e| MediaError::internal(format!("Failed to load ONNX model: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
            labels,
            input_size,
            top_k,
        })
    }

    /// Labels this classifier can produce.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Score an image against the full label head.
    ///
    /// Returns (label, probability) pairs sorted by descending probability.
    pub fn scores(&self, image_path: &Path) -> MediaResult<Vec<(String, f64)>> {
        let img = image::open(image_path)
            .map_err(|e| MediaError::detection_failed(format!("Failed to read frame: {e}")))?;
        let input = image_to_chw_tensor(&img, self.input_size)?;

        let logits = self.run_inference(input)?;
        if logits.len() != self.labels.len() {
            return Err(MediaError::detection_failed(format!(
                "Model produced {} outputs for {} labels",
                logits.len(),
                self.labels.len()
            )));
        }

        let probs = softmax(&logits);
        let mut scored: Vec<(String, f64)> = self
            .labels
            .iter()
            .cloned()
            .zip(probs.into_iter().map(|p| p as f64))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scored)
    }

    fn run_inference(&self, input: Value) -> MediaResult<Vec<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| MediaError::internal("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| MediaError::detection_failed(format!("ONNX inference failed: {e}")))?;

        // Exported classifiers usually name the head "logits"; fall back
        // to the generic "output0".
        let output = outputs
            .get("logits")
            .or_else(|| outputs.get("output0"))
            .ok_or_else(|| MediaError::detection_failed("Missing logits tensor"))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MediaError::detection_failed(format!("Failed to extract tensor: {e}")))?;

        Ok(tensor.1.iter().copied().collect())
    }
}

#[async_trait]
impl DetectionBackend for ImageLabeler {
    async fn detect(&self, frame: &Frame) -> MediaResult<Vec<LabeledObject>> {
        let scored = self.scores(&frame.path)?;
        Ok(scored
            .into_iter()
            .take(self.top_k)
            .map(|(label, score)| LabeledObject::new(label, score))
            .collect())
    }

    fn name(&self) -> &'static str {
        "zero-shot"
    }

    fn uses_ai(&self) -> bool {
        true
    }
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        exps.iter().map(|e| e / sum).collect()
    } else {
        vec![0.0; logits.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_large_logits_stable() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_load_missing_files() {
        let err = ImageLabeler::load("/nonexistent/m.onnx", "/nonexistent/l.txt", 224, 5);
        assert!(matches!(err, Err(MediaError::ModelNotFound(_))));
    }
}
