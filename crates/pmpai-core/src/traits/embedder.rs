//! Embedding port.

use async_trait::async_trait;

use crate::error::Result;

/// Maps text to a fixed-length dense vector suitable for cosine similarity.
///
/// Contract: the same text always yields the same vector, and `dimension()`
/// is constant for the lifetime of the embedder; mixed dimensionalities in
/// one corpus make similarity scores meaningless.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Output vector length. Constant across all calls.
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch. Default delegates to `embed` one at a time;
    /// API backends may override with a single request.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
