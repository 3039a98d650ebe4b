//! Sqlite-backed document and chunk repository.
//!
//! Documents and their chunk generations live in one embedded database.
//! Vectors are stored as little-endian f32 BLOBs; tags as a JSON array
//! string. The connection sits behind a mutex; corpus reads are the only
//! shared state in the pipeline.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use pmpai_core::error::{PmpError, Result};
use pmpai_core::traits::DocumentRepository;
use pmpai_core::types::{Chunk, Document, SearchFilter};

pub struct SqliteKnowledgeStore {
    conn: Mutex<Connection>,
}

impl SqliteKnowledgeStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(store_err)?;
        Self::with_connection(conn)
    }

    /// In-memory store, used by tests and the CLI's dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '[]',
                summary TEXT NOT NULL DEFAULT '',
                source_type TEXT NOT NULL DEFAULT 'upload',
                project_id TEXT,
                file_size INTEGER NOT NULL DEFAULT 0,
                raw_text TEXT NOT NULL DEFAULT '',
                author TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                idx INTEGER NOT NULL,
                content TEXT NOT NULL,
                vector BLOB NOT NULL,
                position INTEGER NOT NULL,
                total_chunks INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);",
        )
        .map_err(store_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn store_err(e: rusqlite::Error) -> PmpError {
    PmpError::Store(e.to_string())
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        blob.extend_from_slice(&v.to_le_bytes());
    }
    blob
}

fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn row_to_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    let tags_json: String = row.get("tags")?;
    let created_at: String = row.get("created_at")?;
    Ok(Document {
        id: row.get("id")?,
        title: row.get("title")?,
        category: row.get("category")?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        summary: row.get("summary")?,
        source_type: row.get("source_type")?,
        project_id: row.get("project_id")?,
        file_size: row.get::<_, i64>("file_size")? as u64,
        raw_text: row.get("raw_text")?,
        author: row.get("author")?,
        created_at: created_at
            .parse()
            .unwrap_or_else(|_| chrono::Utc::now()),
    })
}

fn row_to_chunk(row: &rusqlite::Row<'_>) -> rusqlite::Result<Chunk> {
    let blob: Vec<u8> = row.get("vector")?;
    Ok(Chunk {
        id: row.get("id")?,
        document_id: row.get("document_id")?,
        index: row.get::<_, i64>("idx")? as usize,
        content: row.get("content")?,
        vector: blob_to_vector(&blob),
        position: row.get::<_, i64>("position")? as usize,
        total_chunks: row.get::<_, i64>("total_chunks")? as usize,
    })
}

impl DocumentRepository for SqliteKnowledgeStore {
    fn insert_document(&self, doc: &Document) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| PmpError::Store(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO documents
                (id, title, category, tags, summary, source_type, project_id,
                 file_size, raw_text, author, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                doc.id,
                doc.title,
                doc.category,
                serde_json::to_string(&doc.tags).unwrap_or_else(|_| "[]".into()),
                doc.summary,
                doc.source_type,
                doc.project_id,
                doc.file_size as i64,
                doc.raw_text,
                doc.author,
                doc.created_at.to_rfc3339(),
            ],
        )
        .map_err(store_err)?;
        Ok(())
    }

    fn get_document(&self, id: &str) -> Result<Document> {
        let conn = self.conn.lock().map_err(|e| PmpError::Store(e.to_string()))?;
        conn.query_row(
            "SELECT * FROM documents WHERE id = ?1",
            [id],
            row_to_document,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                PmpError::NotFound(format!("document '{id}'"))
            }
            other => store_err(other),
        })
    }

    fn list_documents(&self, filter: &SearchFilter) -> Result<Vec<Document>> {
        let conn = self.conn.lock().map_err(|e| PmpError::Store(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT * FROM documents ORDER BY created_at DESC")
            .map_err(store_err)?;
        let rows = stmt.query_map([], row_to_document).map_err(store_err)?;
        let mut docs = Vec::new();
        for row in rows {
            let doc = row.map_err(store_err)?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    fn delete_document(&self, id: &str) -> Result<()> {
        let mut conn = self.conn.lock().map_err(|e| PmpError::Store(e.to_string()))?;
        let tx = conn.transaction().map_err(store_err)?;
        let removed = tx
            .execute("DELETE FROM documents WHERE id = ?1", [id])
            .map_err(store_err)?;
        if removed == 0 {
            return Err(PmpError::NotFound(format!("document '{id}'")));
        }
        tx.execute("DELETE FROM chunks WHERE document_id = ?1", [id])
            .map_err(store_err)?;
        tx.commit().map_err(store_err)?;
        Ok(())
    }

    fn replace_chunks(&self, document_id: &str, chunks: &[Chunk]) -> Result<()> {
        let mut conn = self.conn.lock().map_err(|e| PmpError::Store(e.to_string()))?;
        let tx = conn.transaction().map_err(store_err)?;
        // Wholesale swap: the old generation goes away in the same
        // transaction that writes the new one.
        tx.execute("DELETE FROM chunks WHERE document_id = ?1", [document_id])
            .map_err(store_err)?;
        for chunk in chunks {
            tx.execute(
                "INSERT INTO chunks (id, document_id, idx, content, vector, position, total_chunks)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    chunk.id,
                    chunk.document_id,
                    chunk.index as i64,
                    chunk.content,
                    vector_to_blob(&chunk.vector),
                    chunk.position as i64,
                    chunk.total_chunks as i64,
                ],
            )
            .map_err(store_err)?;
        }
        tx.commit().map_err(store_err)?;
        Ok(())
    }

    fn chunks_for_document(&self, document_id: &str) -> Result<Vec<Chunk>> {
        let conn = self.conn.lock().map_err(|e| PmpError::Store(e.to_string()))?;
        let mut stmt = conn
            .prepare("SELECT * FROM chunks WHERE document_id = ?1 ORDER BY idx ASC")
            .map_err(store_err)?;
        let rows = stmt
            .query_map([document_id], row_to_chunk)
            .map_err(store_err)?;
        let mut chunks = Vec::new();
        for row in rows {
            chunks.push(row.map_err(store_err)?);
        }
        Ok(chunks)
    }

    fn candidate_chunks(&self, filter: &SearchFilter) -> Result<Vec<(Chunk, Document)>> {
        let docs = self.list_documents(filter)?;
        let mut out = Vec::new();
        for doc in docs {
            for chunk in self.chunks_for_document(&doc.id)? {
                out.push((chunk, doc.clone()));
            }
        }
        Ok(out)
    }

    fn stats(&self) -> Result<(usize, usize)> {
        let conn = self.conn.lock().map_err(|e| PmpError::Store(e.to_string()))?;
        let docs: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))
            .map_err(store_err)?;
        let chunks: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))
            .map_err(store_err)?;
        Ok((docs as usize, chunks as usize))
    }
}
