//! Retrieval and QA orchestration.
//!
//! Ties the pipeline together: vectorize (chunk → embed → swap chunk
//! generation), search (embed query → filter → score → stable sort →
//! paginate), and answer (search → compose, grounded in the top sources).
//!
//! Filtering always precedes scoring so a narrow filter bounds cost.
//! A failed document never aborts a batch vectorization; a failed
//! downstream call fails only the single request and nothing is cached.

use std::sync::Arc;
use std::time::Instant;

use pmpai_core::config::PmpConfig;
use pmpai_core::error::{PmpError, Result};
use pmpai_core::traits::{AnswerComposer, DocumentRepository, Embedder};
use pmpai_core::types::{Chunk, QaAnswer, SearchFilter, SearchHit, VectorizeOutcome};
use serde::Serialize;

use crate::chunker::chunk_text;
use crate::scorer::{LexicalFields, ScoringWeights};

const EXCERPT_CHARS: usize = 200;

/// One page of scored search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub results: Vec<SearchHit>,
    /// Total matches before pagination.
    pub total: usize,
    pub query: String,
    /// Wall-clock seconds, observability only.
    pub time_taken: f64,
}

/// Per-document outcome of a batch vectorization.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemOutcome {
    pub knowledge_id: String,
    pub chunk_count: usize,
    pub error: Option<String>,
}

pub struct RetrievalEngine {
    repo: Arc<dyn DocumentRepository>,
    embedder: Arc<dyn Embedder>,
    composer: Arc<dyn AnswerComposer>,
    weights: ScoringWeights,
    chunk_size: usize,
    overlap: usize,
    top_k: usize,
}

impl RetrievalEngine {
    pub fn new(
        repo: Arc<dyn DocumentRepository>,
        embedder: Arc<dyn Embedder>,
        composer: Arc<dyn AnswerComposer>,
        config: &PmpConfig,
    ) -> Self {
        Self {
            repo,
            embedder,
            composer,
            weights: ScoringWeights::from(&config.scoring),
            chunk_size: config.knowledge.chunk_size,
            overlap: config.knowledge.overlap,
            top_k: config.knowledge.top_k,
        }
    }

    pub fn repository(&self) -> Arc<dyn DocumentRepository> {
        self.repo.clone()
    }

    /// Chunk and embed one document, swapping its chunk generation
    /// wholesale. Idempotent: identical text and parameters produce an
    /// identical chunk sequence.
    pub async fn vectorize(
        &self,
        knowledge_id: &str,
        chunk_size: Option<usize>,
        overlap: Option<usize>,
    ) -> Result<VectorizeOutcome> {
        let chunk_size = chunk_size.unwrap_or(self.chunk_size);
        let overlap = overlap.unwrap_or(self.overlap);
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(PmpError::InvalidRequest(format!(
                "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }

        let doc = self.repo.get_document(knowledge_id)?;
        if doc.raw_text.trim().is_empty() {
            return Err(PmpError::EmptyContent {
                stage: "vectorize".into(),
                length: 0,
                min: 1,
            });
        }

        let pieces: Vec<_> = chunk_text(&doc.raw_text, chunk_size, overlap).collect();
        let contents: Vec<String> = pieces.iter().map(|p| p.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&contents).await?;

        let total = pieces.len();
        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(index, (piece, vector))| Chunk {
                id: uuid::Uuid::new_v4().to_string(),
                document_id: doc.id.clone(),
                index,
                content: piece.content,
                vector,
                position: piece.position,
                total_chunks: total,
            })
            .collect();

        self.repo.replace_chunks(&doc.id, &chunks)?;
        tracing::info!(
            "Vectorized document '{}': {} chunk(s), size={}, overlap={}",
            doc.id,
            total,
            chunk_size,
            overlap
        );

        Ok(VectorizeOutcome {
            knowledge_id: doc.id,
            chunk_count: total,
            chunk_ids: chunks.into_iter().map(|c| c.id).collect(),
            status: "completed".into(),
        })
    }

    /// Vectorize many documents. One bad document is logged and skipped;
    /// the batch always runs to completion.
    pub async fn vectorize_batch(&self, knowledge_ids: &[String]) -> Vec<BatchItemOutcome> {
        let mut outcomes = Vec::with_capacity(knowledge_ids.len());
        for id in knowledge_ids {
            match self.vectorize(id, None, None).await {
                Ok(outcome) => outcomes.push(BatchItemOutcome {
                    knowledge_id: id.clone(),
                    chunk_count: outcome.chunk_count,
                    error: None,
                }),
                Err(e) => {
                    tracing::warn!("Skipping document '{id}' in batch vectorization: {e}");
                    outcomes.push(BatchItemOutcome {
                        knowledge_id: id.clone(),
                        chunk_count: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        outcomes
    }

    /// Embed the query, score the filtered corpus, and return one page.
    pub async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage> {
        let started = Instant::now();
        let query = query.trim();
        if query.is_empty() {
            return Err(PmpError::InvalidRequest("query must not be empty".into()));
        }

        let hits = self.retrieve(query, filter).await?;
        let total = hits.len();
        let results: Vec<SearchHit> = hits.into_iter().skip(offset).take(limit).collect();

        Ok(SearchPage {
            results,
            total,
            query: query.to_string(),
            time_taken: started.elapsed().as_secs_f64(),
        })
    }

    /// Answer a question grounded in the top retrieved sources.
    ///
    /// An empty question is rejected before any embedding or downstream
    /// call is attempted.
    pub async fn answer(
        &self,
        question: &str,
        project_id: Option<&str>,
        filter: &SearchFilter,
    ) -> Result<QaAnswer> {
        let started = Instant::now();
        let question = question.trim();
        if question.is_empty() {
            return Err(PmpError::InvalidRequest(
                "question must not be empty".into(),
            ));
        }

        let mut filter = filter.clone();
        if let Some(project_id) = project_id {
            filter.project_id = Some(project_id.to_string());
        }

        let hits = self.retrieve(question, &filter).await?;
        let sources: Vec<SearchHit> = hits.into_iter().take(self.top_k).collect();
        let answer = self.composer.compose(question, &sources).await?;

        Ok(QaAnswer {
            answer,
            sources,
            question: question.to_string(),
            time_taken: started.elapsed().as_secs_f64(),
        })
    }

    /// Shared retrieval core: embed, filter, score, stable-sort descending.
    /// The sort is stable so equal scores keep their corpus order.
    async fn retrieve(&self, query: &str, filter: &SearchFilter) -> Result<Vec<SearchHit>> {
        let query_vector = self.embedder.embed(query).await?;
        let candidates = self.repo.candidate_chunks(filter)?;

        let mut hits: Vec<SearchHit> = candidates
            .into_iter()
            .map(|(chunk, doc)| {
                let score = self.weights.score(
                    &query_vector,
                    &chunk.vector,
                    query,
                    LexicalFields {
                        title: &doc.title,
                        summary: &doc.summary,
                        tags: &doc.tags,
                    },
                );
                SearchHit {
                    document_id: doc.id,
                    title: doc.title,
                    category: doc.category,
                    chunk_id: chunk.id,
                    chunk_index: chunk.index,
                    excerpt: excerpt_of(&chunk.content),
                    score,
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(hits)
    }
}

fn excerpt_of(content: &str) -> String {
    if content.chars().count() <= EXCERPT_CHARS {
        content.to_string()
    } else {
        content.chars().take(EXCERPT_CHARS).collect()
    }
}
