//! Clipsight analysis pipeline.
//!
//! Composes the media layer (probe, sampler, detection backends) with the
//! decision layer (classification cascade, anomaly scorer, summary and
//! recommendations) into a single `analyze` call:
//!
//! probe → sample → detect → classify → score → summarize → recommend →
//! assemble result.
//!
//! Every stage past source acquisition degrades instead of failing; the
//! pipeline always returns a complete result or a single fatal error.

pub mod analyzer;
pub mod anomaly;
pub mod classify;
pub mod config;
pub mod error;
pub mod llm;
pub mod recommend;
pub mod store;
pub mod summary;

pub use analyzer::Analyzer;
pub use anomaly::{AnomalyVerdict, FixedNoise, NoiseSource, ThreadRngNoise};
pub use classify::ContentClassifier;
pub use config::{LlmConfig, PipelineConfig, ScoringConfig};
pub use error::{PipelineError, PipelineResult};
pub use llm::LlmClient;
pub use store::{AnalysisStore, MemoryStore, StoredAnalysis};
