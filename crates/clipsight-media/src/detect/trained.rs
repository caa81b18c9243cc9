//! Trained object-detection backend (YOLOv8-style ONNX).

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::debug;

use clipsight_models::LabeledObject;

use crate::error::{MediaError, MediaResult};
use crate::sampler::Frame;

use super::{image_to_chw_tensor, DetectionBackend, DetectorConfig};

/// COCO class names (80 classes), indexed by model class id.
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "stop sign", "parking meter", "bench",
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe", "backpack", "umbrella", "handbag", "tie", "suitcase", "frisbee",
    "skis", "snowboard", "sports ball", "kite", "baseball bat", "baseball glove",
    "skateboard", "surfboard", "tennis racket", "bottle", "wine glass", "cup",
    "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
    "toothbrush",
];

const NUM_CLASSES: usize = 80;
const NUM_BOXES: usize = 8400;
const NUM_FEATURES: usize = 84; // 4 bbox + 80 class scores

/// Object detector backed by a YOLOv8-style ONNX model.
///
/// The pipeline only needs labels and scores, so box geometry is discarded
/// and candidates are collapsed to the best score per class.
pub struct TrainedDetector {
    session: Mutex<Session>,
    confidence_threshold: f32,
    input_size: u32,
}

impl TrainedDetector {
    /// Load the detector; errors if the model file is missing or invalid.
    pub fn load(config: &DetectorConfig) -> MediaResult<Self> {
        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            return Err(MediaError::model_not_found(&config.model_path));
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
            confidence_threshold: config.confidence_threshold,
            input_size: config.input_size,
        })
    }

    fn run_inference(&self, input: Value) -> MediaResult<Vec<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| MediaError::internal("Session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| MediaError::detection_failed(format!("ONNX inference failed: {e}")))?;

        let output = outputs
            .get("output0")
            .ok_or_else(|| MediaError::detection_failed("Missing output0 tensor"))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MediaError::detection_failed(format!("Failed to extract tensor: {e}")))?;

        Ok(tensor.1.iter().copied().collect())
    }

    /// Collapse raw YOLOv8 output ([1, 84, 8400]) to per-class best scores.
    fn postprocess(&self, outputs: &[f32]) -> MediaResult<Vec<LabeledObject>> {
        if outputs.len() != NUM_FEATURES * NUM_BOXES {
            return Err(MediaError::detection_failed(format!(
                "Unexpected output size: expected {}, got {}",
                NUM_FEATURES * NUM_BOXES,
                outputs.len()
            )));
        }

        let output_array = Array::from_shape_vec((NUM_FEATURES, NUM_BOXES), outputs.to_vec())
            .map_err(|e| MediaError::detection_failed(format!("Failed to reshape output: {e}")))?;
        let transposed = output_array.t(); // [8400, 84]

        let mut best_per_class = [0.0f32; NUM_CLASSES];
        for i in 0..NUM_BOXES {
            for c in 0..NUM_CLASSES {
                let score = transposed[[i, 4 + c]];
                if score > best_per_class[c] {
                    best_per_class[c] = score;
                }
            }
        }

        let mut detections: Vec<LabeledObject> = best_per_class
            .iter()
            .enumerate()
            .filter(|(_, score)| **score >= self.confidence_threshold)
            .map(|(c, score)| LabeledObject::new(COCO_CLASSES[c], *score as f64))
            .collect();

        detections.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(detections)
    }
}

#[async_trait]
impl DetectionBackend for TrainedDetector {
    async fn detect(&self, frame: &Frame) -> MediaResult<Vec<LabeledObject>> {
        let img = image::open(&frame.path)
            .map_err(|e| MediaError::detection_failed(format!("Failed to read frame: {e}")))?;

        let input = image_to_chw_tensor(&img, self.input_size)?;
        let outputs = self.run_inference(input)?;
        let detections = self.postprocess(&outputs)?;

        debug!(
            timestamp = frame.timestamp,
            count = detections.len(),
            "Trained detection completed"
        );
        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "trained"
    }

    fn uses_ai(&self) -> bool {
        true
    }
}
