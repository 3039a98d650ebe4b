//! Domain types shared across the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ingested document, owned by the knowledge subsystem. Its text is
/// only ever replaced as a whole, never edited in place, and
/// re-vectorization regenerates the chunk generation wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Auto-generated abstract, used by the lexical boost at search time.
    #[serde(default)]
    pub summary: String,
    /// Where the document came from: "upload", "api", "ingest".
    pub source_type: String,
    /// Owning project, when the document was uploaded against one.
    pub project_id: Option<String>,
    pub file_size: u64,
    pub raw_text: String,
    #[serde(default)]
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn new(title: &str, category: &str, source_type: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            category: category.to_string(),
            tags: Vec::new(),
            summary: String::new(),
            source_type: source_type.to_string(),
            project_id: None,
            file_size: 0,
            raw_text: String::new(),
            author: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// One embedded slice of a document's text, the unit of retrieval.
///
/// `document_id` is a back-reference only; the document owns its chunks.
/// Chunk `index` values for a document are contiguous starting at 0, and
/// every vector in a corpus has the same dimensionality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub index: usize,
    pub content: String,
    pub vector: Vec<f32>,
    /// Character offset of the chunk start within the extracted text.
    pub position: usize,
    pub total_chunks: usize,
}

impl Chunk {
    /// 1-based ordinal for display, always `index + 1`.
    pub fn chunk_number(&self) -> usize {
        self.index + 1
    }
}

/// Query-time narrowing of the candidate corpus. Not persisted.
/// Filtering always happens before scoring to bound cost.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub project_id: Option<String>,
}

impl SearchFilter {
    /// Document-level predicate. Category/author/date are exact matches,
    /// tags match when the document carries any of the requested tags.
    pub fn matches(&self, doc: &Document) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&doc.category) {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| doc.tags.contains(t)) {
            return false;
        }
        if let Some(from) = self.date_from {
            if doc.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if doc.created_at > to {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if &doc.author != author {
                return false;
            }
        }
        if let Some(project_id) = &self.project_id {
            if doc.project_id.as_deref() != Some(project_id.as_str()) {
                return false;
            }
        }
        true
    }
}

/// A scored retrieval result, with enough metadata for attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: String,
    pub title: String,
    pub category: String,
    pub chunk_id: String,
    pub chunk_index: usize,
    /// Content excerpt the score was computed against.
    pub excerpt: String,
    pub score: f32,
}

/// Result of a question-answering call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaAnswer {
    pub answer: String,
    pub sources: Vec<SearchHit>,
    pub question: String,
    /// Wall-clock seconds, observability only.
    pub time_taken: f64,
}

/// Result of (re-)vectorizing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizeOutcome {
    pub knowledge_id: String,
    pub chunk_count: usize,
    pub chunk_ids: Vec<String>,
    pub status: String,
}
