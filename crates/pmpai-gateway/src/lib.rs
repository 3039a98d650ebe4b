//! # PMP.AI Gateway
//!
//! HTTP API over the knowledge pipeline using Axum:
//! extract, document CRUD, vectorize (single and batch), search, and QA.

pub mod error;
pub mod routes;
pub mod server;

pub use server::{build_router, start, AppState};
