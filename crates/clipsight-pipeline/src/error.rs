//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors surfaced by the analysis pipeline.
///
/// Only source acquisition is fatal; sub-component failures are handled
/// by the documented fallbacks and never reach the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Media error: {0}")]
    Media(#[from] clipsight_media::MediaError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store operation failed: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn store_failed(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
