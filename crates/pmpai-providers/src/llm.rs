//! OpenAI-compatible chat-completion adapter for grounded answers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use pmpai_core::config::LlmConfig;
use pmpai_core::error::{PmpError, Result};
use pmpai_core::traits::AnswerComposer;
use pmpai_core::types::SearchHit;

const SYSTEM_PROMPT: &str = "You are the PMP.AI project-management assistant. \
Answer the user's question using ONLY the provided sources. \
Cite sources by their bracketed number. \
If the sources do not contain the answer, say so.";

/// Forwards the question plus retrieved sources to a chat-completion
/// endpoint as grounding context.
pub struct LlmComposer {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl LlmComposer {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(PmpError::Config(
                "llm.endpoint is required for the api provider".into(),
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
            temperature: config.temperature,
            client,
        })
    }

    fn grounding_context(sources: &[SearchHit]) -> String {
        let mut context = String::from("Sources:\n");
        for (i, hit) in sources.iter().enumerate() {
            context.push_str(&format!(
                "[{}] {} ({}): {}\n",
                i + 1,
                hit.title,
                hit.category,
                hit.excerpt
            ));
        }
        context
    }

    fn request_body(&self, question: &str, sources: &[SearchHit]) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": format!("{}\n\nQuestion: {question}", Self::grounding_context(sources)) },
            ],
        })
    }
}

#[async_trait]
impl AnswerComposer for LlmComposer {
    fn name(&self) -> &str {
        "api"
    }

    async fn compose(&self, question: &str, sources: &[SearchHit]) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&self.request_body(question, sources));
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!("Chat request failed ({url}): {e}");
            PmpError::DownstreamUnavailable(format!("chat request failed ({url}): {e}"))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!("Chat API returned {status}");
            return Err(PmpError::DownstreamUnavailable(format!(
                "chat API returned {status}: {body}"
            )));
        }

        let payload: Value = resp.json().await.map_err(|e| {
            PmpError::DownstreamUnavailable(format!("malformed chat response: {e}"))
        })?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                PmpError::DownstreamUnavailable("chat response missing message content".into())
            })
    }
}
