//! Error taxonomy for the PMP.AI pipeline.
//!
//! Extraction and chunking failures are fatal for the document they belong
//! to; batch jobs log and skip. Retrieval-time failures fail the single
//! request. The gateway maps each variant to an HTTP status code.

use thiserror::Error;

/// Result alias used across all PMP.AI crates.
pub type Result<T> = std::result::Result<T, PmpError>;

#[derive(Error, Debug)]
pub enum PmpError {
    /// Missing or malformed caller input (HTTP 400).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unrecognized file type; nothing knows how to decode it (HTTP 400).
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A decoder ran but could not produce text (HTTP 400).
    #[error("Extraction failed at {stage}: {reason}")]
    ExtractionFailed { stage: String, reason: String },

    /// Extraction produced text too short to be usable (HTTP 400).
    /// Chunking and embedding near-empty text is meaningless downstream.
    #[error("Empty content at {stage}: got {length} chars, need at least {min}")]
    EmptyContent {
        stage: String,
        length: usize,
        min: usize,
    },

    /// Embedding/LLM API error or timeout (HTTP 500). Retries are the
    /// caller's policy, never this pipeline's.
    #[error("Downstream service unavailable: {0}")]
    DownstreamUnavailable(String),

    /// Referenced document or knowledge id does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage layer failure (HTTP 500).
    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PmpError {
    /// Whether the caller (not the service) is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::UnsupportedFormat(_)
                | Self::ExtractionFailed { .. }
                | Self::EmptyContent { .. }
                | Self::NotFound(_)
        )
    }
}
