//! Analysis result persistence.
//!
//! The pipeline hands completed results to an [`AnalysisStore`]; the
//! in-memory implementation backs tests and the CLI, and the trait is the
//! seam for a real database later.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clipsight_models::AnalysisResult;

use crate::error::{PipelineError, PipelineResult};

/// A persisted analysis with its ownership context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: String,
    pub owner_id: String,
    pub game_id: String,
    pub region: String,
    pub result: AnalysisResult,
    pub saved_at: DateTime<Utc>,
}

/// Storage backend for completed analyses.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist a result and return its assigned id.
    async fn save(
        &self,
        result: &AnalysisResult,
        owner_id: &str,
        game_id: &str,
        region: &str,
    ) -> PipelineResult<String>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<StoredAnalysis>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all saved records, newest last.
    pub fn records(&self) -> PipelineResult<Vec<StoredAnalysis>> {
        let records = self
            .records
            .lock()
            .map_err(|_| PipelineError::store_failed("store lock poisoned"))?;
        Ok(records.clone())
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn save(
        &self,
        result: &AnalysisResult,
        owner_id: &str,
        game_id: &str,
        region: &str,
    ) -> PipelineResult<String> {
        let id = Uuid::new_v4().to_string();
        let record = StoredAnalysis {
            id: id.clone(),
            owner_id: owner_id.to_string(),
            game_id: game_id.to_string(),
            region: region.to_string(),
            result: result.clone(),
            saved_at: Utc::now(),
        };
        let mut records = self
            .records
            .lock()
            .map_err(|_| PipelineError::store_failed("store lock poisoned"))?;
        records.push(record);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipsight_models::{Classification, VideoMetadata};

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            content_type: Classification::unknown().content_type,
            content_summary: "Analyzed 0 sampled frames. 0 key moments identified.".to_string(),
            analysis_confidence: 0.4,
            timestamped_highlights: vec![],
            detections: vec![],
            potential_misclassifications: vec![],
            metadata: VideoMetadata::unavailable(),
            cheat_flag: false,
            cheat_score: 0.0,
            headshot_rate: 0.0,
            recommendations: vec![],
        }
    }

    #[tokio::test]
    async fn test_save_assigns_unique_ids() {
        let store = MemoryStore::new();
        let result = sample_result();
        let a = store.save(&result, "owner-1", "game-1", "na").await.unwrap();
        let b = store.save(&result, "owner-1", "game-1", "na").await.unwrap();
        assert_ne!(a, b);

        let records = store.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, a);
        assert_eq!(records[0].owner_id, "owner-1");
        assert_eq!(records[0].region, "na");
    }
}
