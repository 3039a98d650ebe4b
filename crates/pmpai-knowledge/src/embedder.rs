//! Deterministic stub embedder.
//!
//! A real deployment swaps in an embedding API behind the same `Embedder`
//! port (see `pmpai-providers`). The stub preserves the contract that
//! matters to the rest of the pipeline: same text, same vector; one
//! dimensionality across the whole corpus; dense real values on the unit
//! sphere so cosine similarity is well-behaved.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use pmpai_core::error::Result;
use pmpai_core::traits::Embedder;

/// Hash-based pseudo-embedding: SHA-256 of the text, counter-chained into
/// as many blocks as the dimension needs, each 4-byte word mapped to
/// [-1, 1], then L2-normalized.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let seed = Sha256::digest(text.as_bytes());
        let mut values = Vec::with_capacity(self.dimension);
        let mut counter: u32 = 0;

        'fill: loop {
            let mut hasher = Sha256::new();
            hasher.update(seed);
            hasher.update(counter.to_le_bytes());
            let block = hasher.finalize();
            for word in block.chunks_exact(4) {
                let raw = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
                values.push((raw as f32 / u32::MAX as f32) * 2.0 - 1.0);
                if values.len() == self.dimension {
                    break 'fill;
                }
            }
            counter += 1;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut values {
                *v /= norm;
            }
        }
        values
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() {
        let e = HashEmbedder::new(256);
        let a = e.embed("风险管理计划").await.unwrap();
        let b = e.embed("风险管理计划").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_constant_dimension() {
        let e = HashEmbedder::new(256);
        assert_eq!(e.embed("short").await.unwrap().len(), 256);
        assert_eq!(e.embed(&"long ".repeat(500)).await.unwrap().len(), 256);
        assert_eq!(e.dimension(), 256);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let e = HashEmbedder::new(64);
        let a = e.embed("milestone review").await.unwrap();
        let b = e.embed("expert matching").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_unit_norm() {
        let e = HashEmbedder::new(128);
        let v = e.embed("budget baseline").await.unwrap();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_batch_matches_single() {
        let e = HashEmbedder::new(32);
        let batch = e
            .embed_batch(&["alpha".to_string(), "beta".to_string()])
            .await
            .unwrap();
        assert_eq!(batch[0], e.embed("alpha").await.unwrap());
        assert_eq!(batch[1], e.embed("beta").await.unwrap());
    }
}
