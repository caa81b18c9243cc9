//! Shared data models for the Clipsight analysis pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Video metadata probed from a source clip
//! - Per-frame object/scene detections
//! - Content classification verdicts
//! - Timestamped highlights
//! - The terminal analysis result aggregate

pub mod analysis;
pub mod classification;
pub mod detection;
pub mod highlight;
pub mod metadata;
pub mod utils;

// Re-export common types
pub use analysis::AnalysisResult;
pub use classification::{Classification, ContentType};
pub use detection::{FrameDetections, LabeledObject};
pub use highlight::Highlight;
pub use metadata::VideoMetadata;
pub use utils::{clamp_rate, clamp_unit, round1, round2, round3};
