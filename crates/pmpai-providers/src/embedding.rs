//! OpenAI-compatible embeddings adapter.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use pmpai_core::config::EmbeddingConfig;
use pmpai_core::error::{PmpError, Result};
use pmpai_core::traits::Embedder;

/// Calls `{endpoint}/embeddings` and enforces the configured
/// dimensionality so mixed-dimension vectors can never enter the corpus.
pub struct ApiEmbedder {
    endpoint: String,
    api_key: String,
    model: String,
    dimension: usize,
    client: reqwest::Client,
}

impl ApiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(PmpError::Config(
                "embedding.endpoint is required for the api provider".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PmpError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
            client,
        })
    }

    fn request_body(&self, texts: &[String]) -> Value {
        json!({
            "model": self.model,
            "input": texts,
        })
    }

    async fn call(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.endpoint);
        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&self.request_body(texts));
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!("Embedding request failed ({url}): {e}");
            PmpError::DownstreamUnavailable(format!("embedding request failed ({url}): {e}"))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!("Embedding API returned {status}");
            return Err(PmpError::DownstreamUnavailable(format!(
                "embedding API returned {status}: {body}"
            )));
        }

        let payload: Value = resp.json().await.map_err(|e| {
            PmpError::DownstreamUnavailable(format!("malformed embedding response: {e}"))
        })?;

        let data = payload["data"].as_array().ok_or_else(|| {
            PmpError::DownstreamUnavailable("embedding response missing 'data'".into())
        })?;

        let mut vectors = Vec::with_capacity(data.len());
        for item in data {
            let vector: Vec<f32> = item["embedding"]
                .as_array()
                .ok_or_else(|| {
                    PmpError::DownstreamUnavailable(
                        "embedding response item missing 'embedding'".into(),
                    )
                })?
                .iter()
                .filter_map(|v| v.as_f64())
                .map(|v| v as f32)
                .collect();
            if vector.len() != self.dimension {
                return Err(PmpError::Config(format!(
                    "embedding API returned dimension {}, configured {}",
                    vector.len(),
                    self.dimension
                )));
            }
            vectors.push(vector);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    fn name(&self) -> &str {
        "api"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.call(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            PmpError::DownstreamUnavailable("embedding API returned no vectors".into())
        })
    }

    /// One request for the whole batch instead of one per chunk.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.call(texts).await?;
        if vectors.len() != texts.len() {
            return Err(PmpError::DownstreamUnavailable(format!(
                "embedding API returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder() -> ApiEmbedder {
        let config = EmbeddingConfig {
            provider: "api".into(),
            endpoint: "https://api.example.com/v1/".into(),
            api_key: "k".into(),
            model: "text-embedding-3-small".into(),
            dimension: 3,
            timeout_secs: 5,
        };
        ApiEmbedder::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        assert_eq!(embedder().endpoint, "https://api.example.com/v1");
    }

    #[test]
    fn test_request_body_shape() {
        let body = embedder().request_body(&["chunk one".into(), "chunk two".into()]);
        assert_eq!(body["model"], "text-embedding-3-small");
        assert_eq!(body["input"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_endpoint_rejected() {
        let config = EmbeddingConfig::default();
        assert!(ApiEmbedder::new(&config).is_err());
    }
}
