//! Object-detection backend cascade.
//!
//! Backends are tried in a fixed preference order and the first available
//! one is used for the entire batch:
//! 1. [`trained::TrainedDetector`]: YOLOv8-style ONNX object detection
//! 2. [`labeler::ImageLabeler`]: general ONNX image classifier used as a
//!    zero-shot labeler
//! 3. [`heuristic::HeuristicDetector`]: file-size detail proxy, always
//!    available
//!
//! Availability is determined once at pipeline start, never per frame.

pub mod heuristic;
pub mod labeler;
pub mod trained;

use std::sync::Arc;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use image::DynamicImage;
use ort::value::{Tensor, Value};
use tracing::{info, warn};

use clipsight_models::{FrameDetections, LabeledObject};

use crate::error::{MediaError, MediaResult};
use crate::sampler::Frame;

pub use heuristic::HeuristicDetector;
pub use labeler::ImageLabeler;
pub use trained::TrainedDetector;

/// Detection backend configuration.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Path to the trained object-detection ONNX model
    pub model_path: String,
    /// Path to the general image-classification ONNX model
    pub labeler_model_path: String,
    /// Path to the labeler's sidecar label list (one label per line)
    pub labeler_labels_path: String,
    /// Confidence threshold for trained-model detections
    pub confidence_threshold: f32,
    /// Model input size (square)
    pub input_size: u32,
    /// How many labels the zero-shot labeler reports per frame
    pub labeler_top_k: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: "models/detect/yolov8n.onnx".to_string(),
            labeler_model_path: "models/classify/general.onnx".to_string(),
            labeler_labels_path: "models/classify/general_labels.txt".to_string(),
            confidence_threshold: 0.25,
            input_size: 640,
            labeler_top_k: 5,
        }
    }
}

/// A frame-level detection backend.
///
/// Contract: given a frame, return detections ordered by descending score.
/// An empty list is a valid result (nothing found), not an error.
#[async_trait]
pub trait DetectionBackend: Send + Sync {
    async fn detect(&self, frame: &Frame) -> MediaResult<Vec<LabeledObject>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Whether this backend uses ML inference (vs pure heuristics).
    fn uses_ai(&self) -> bool;
}

/// Pick the first available backend in preference order.
pub fn select_backend(config: &DetectorConfig) -> Arc<dyn DetectionBackend> {
    match TrainedDetector::load(config) {
        Ok(detector) => {
            info!(model = %config.model_path, "Using trained object-detection backend");
            return Arc::new(detector);
        }
        Err(e) => warn!(error = %e, "Trained detector unavailable, trying zero-shot labeler"),
    }

    match ImageLabeler::load(
        &config.labeler_model_path,
        &config.labeler_labels_path,
        config.input_size,
        config.labeler_top_k,
    ) {
        Ok(labeler) => {
            info!(model = %config.labeler_model_path, "Using zero-shot labeler backend");
            return Arc::new(labeler);
        }
        Err(e) => warn!(error = %e, "Zero-shot labeler unavailable, using heuristic backend"),
    }

    info!("Using heuristic detail-proxy backend");
    Arc::new(HeuristicDetector)
}

/// Detect objects in every frame with bounded concurrency.
///
/// Results are reassembled in timestamp order. A per-frame detection
/// failure degrades to an empty object list so the output always has one
/// entry per sampled frame.
pub async fn detect_batch(
    backend: Arc<dyn DetectionBackend>,
    frames: &[Frame],
    max_parallel: usize,
) -> Vec<FrameDetections> {
    let tasks = frames.iter().map(|frame| {
        let backend = Arc::clone(&backend);
        async move {
            match backend.detect(frame).await {
                Ok(objects) => FrameDetections {
                    timestamp: frame.timestamp,
                    objects,
                },
                Err(e) => {
                    warn!(
                        timestamp = frame.timestamp,
                        backend = backend.name(),
                        error = %e,
                        "Frame detection failed, recording empty detections"
                    );
                    FrameDetections::empty(frame.timestamp)
                }
            }
        }
    });

    let mut detections: Vec<FrameDetections> = stream::iter(tasks)
        .buffer_unordered(max_parallel.max(1))
        .collect()
        .await;

    detections.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
    detections
}

/// Preprocess an image into a normalized NCHW float tensor.
pub(crate) fn image_to_chw_tensor(img: &DynamicImage, input_size: u32) -> MediaResult<Value> {
    let resized = img.resize_exact(
        input_size,
        input_size,
        image::imageops::FilterType::Triangle,
    );
    let rgb = resized.to_rgb8();
    let (w, h) = (input_size as usize, input_size as usize);

    let mut chw_data: Vec<f32> = Vec::with_capacity(3 * h * w);
    for c in 0..3 {
        for y in 0..h {
            for x in 0..w {
                let pixel = rgb.get_pixel(x as u32, y as u32);
                chw_data.push(pixel[c] as f32 / 255.0);
            }
        }
    }

    let shape = vec![1usize, 3, h, w];
    Tensor::from_array((shape, chw_data.into_boxed_slice()))
        .map(Value::from)
        .map_err(|e| MediaError::internal(format!("Failed to create tensor: {e}")))
}
