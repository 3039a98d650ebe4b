//! Capability ports for the pipeline.
//!
//! Each "smart" capability is a trait with swappable implementations: a
//! deterministic stub for tests/offline use and a thin API adapter for
//! production. Selection happens once at wiring time, never by branching
//! on the environment inside the pipeline.

pub mod composer;
pub mod embedder;
pub mod enrich;
pub mod repository;

pub use composer::AnswerComposer;
pub use embedder::Embedder;
pub use enrich::{Summarizer, Tagger};
pub use repository::DocumentRepository;
