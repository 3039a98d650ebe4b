//! Answer-composition port.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::SearchHit;

/// Turns a question plus retrieved sources into a natural-language answer.
///
/// The template implementation is deterministic string assembly; the API
/// implementation forwards question and sources to a chat-completion
/// endpoint as grounding context.
#[async_trait]
pub trait AnswerComposer: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &str;

    async fn compose(&self, question: &str, sources: &[SearchHit]) -> Result<String>;
}
