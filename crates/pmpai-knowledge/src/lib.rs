//! # PMP.AI Knowledge Pipeline
//!
//! The document ingestion and retrieval subsystem:
//!
//! ```text
//! upload → text extraction → chunking → embedding → similarity search → grounded answer
//! ```
//!
//! - **Chunker**: overlapping windows cut at sentence boundaries
//! - **HashEmbedder**: deterministic stub vectors (swap in an API embedder
//!   via the `Embedder` port for production)
//! - **Scorer**: cosine similarity plus configurable lexical boosts
//! - **SqliteKnowledgeStore**: documents and chunk generations in sqlite,
//!   vectors as f32 BLOBs
//! - **RetrievalEngine**: vectorize / search / QA orchestration
//!
//! All stages are request-scoped and stateless; the store is the only
//! shared state. Re-vectorization is idempotent and replace-not-append.

pub mod chunker;
pub mod compose;
pub mod embedder;
pub mod mock;
pub mod retrieval;
pub mod scorer;
pub mod store;

pub use chunker::{chunk_text, ChunkPiece};
pub use compose::TemplateComposer;
pub use embedder::HashEmbedder;
pub use retrieval::{BatchItemOutcome, RetrievalEngine, SearchPage};
pub use scorer::{cosine_similarity, LexicalFields, ScoringWeights};
pub use store::SqliteKnowledgeStore;
