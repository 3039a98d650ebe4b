//! Document-enrichment ports, applied once at upload time.

use async_trait::async_trait;

use crate::error::Result;

/// Produces a short abstract of a document's text. The summary feeds the
/// lexical boost at search time.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Suggests tags for a document. Used when an upload carries none.
#[async_trait]
pub trait Tagger: Send + Sync {
    fn name(&self) -> &str;

    async fn tag(&self, text: &str, max_tags: usize) -> Result<Vec<String>>;
}
