//! Storage port for documents and their chunk generations.

use crate::error::Result;
use crate::types::{Chunk, Document, SearchFilter};

/// CRUD over documents plus wholesale chunk-generation management.
///
/// Implementations are synchronous; the reference store is an embedded
/// sqlite database guarded by a mutex, and corpus reads are the only shared
/// state in the pipeline. Callers hold `Arc<dyn DocumentRepository>`.
pub trait DocumentRepository: Send + Sync {
    fn insert_document(&self, doc: &Document) -> Result<()>;

    /// `NotFound` when the id is absent.
    fn get_document(&self, id: &str) -> Result<Document>;

    fn list_documents(&self, filter: &SearchFilter) -> Result<Vec<Document>>;

    /// Removes the document and all of its chunks.
    fn delete_document(&self, id: &str) -> Result<()>;

    /// Replace the document's entire chunk generation atomically.
    /// Chunks are never appended to or mutated in place; re-vectorization
    /// always swaps the whole set.
    fn replace_chunks(&self, document_id: &str, chunks: &[Chunk]) -> Result<()>;

    fn chunks_for_document(&self, document_id: &str) -> Result<Vec<Chunk>>;

    /// All chunks whose parent document passes the filter, paired with the
    /// parent. This is the candidate corpus for scoring; filtering happens
    /// here, before any score is computed.
    fn candidate_chunks(&self, filter: &SearchFilter) -> Result<Vec<(Chunk, Document)>>;

    /// (document count, chunk count)
    fn stats(&self) -> Result<(usize, usize)>;
}
