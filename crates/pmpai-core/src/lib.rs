//! # PMP.AI Core
//!
//! Shared foundation for the PMP.AI knowledge pipeline:
//! - Domain types (documents, chunks, search filters, response shapes)
//! - Error taxonomy with a crate-wide `Result` alias
//! - TOML configuration with env override
//! - Capability traits (`Embedder`, `AnswerComposer`, `Summarizer`, `Tagger`)
//!   and the `DocumentRepository` storage port
//!
//! Every "smart" capability is a trait so implementations stay swappable:
//! deterministic stubs for tests and offline use, thin API adapters for
//! production. Callers depend on the ports, never on a concrete backend.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{PmpError, Result};
