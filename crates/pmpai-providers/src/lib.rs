//! # PMP.AI Providers
//!
//! Thin adapters to external AI services, plus the factories that choose
//! between a deterministic stub and a real API backend from configuration.
//! Both adapters speak the OpenAI-compatible wire format; different
//! vendors are distinguished only by endpoint and API key.
//!
//! Every request carries a timeout and fails closed with
//! `DownstreamUnavailable`; the pipeline never hangs on a downstream
//! call and never retries on its own.

pub mod embedding;
pub mod llm;

use std::sync::Arc;

use pmpai_core::config::PmpConfig;
use pmpai_core::error::{PmpError, Result};
use pmpai_core::traits::{AnswerComposer, Embedder};
use pmpai_knowledge::{HashEmbedder, TemplateComposer};

/// Create the embedding backend selected by `[embedding].provider`.
pub fn create_embedder(config: &PmpConfig) -> Result<Arc<dyn Embedder>> {
    match config.embedding.provider.as_str() {
        "hash" => Ok(Arc::new(HashEmbedder::new(config.embedding.dimension))),
        "api" => Ok(Arc::new(embedding::ApiEmbedder::new(&config.embedding)?)),
        other => Err(PmpError::Config(format!(
            "unknown embedding provider '{other}' (expected 'hash' or 'api')"
        ))),
    }
}

/// Create the answer-composition backend selected by `[llm].provider`.
pub fn create_composer(config: &PmpConfig) -> Result<Arc<dyn AnswerComposer>> {
    match config.llm.provider.as_str() {
        "template" => Ok(Arc::new(TemplateComposer::default())),
        "api" => Ok(Arc::new(llm::LlmComposer::new(&config.llm)?)),
        other => Err(PmpError::Config(format!(
            "unknown llm provider '{other}' (expected 'template' or 'api')"
        ))),
    }
}
