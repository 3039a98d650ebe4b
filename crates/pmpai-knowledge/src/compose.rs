//! Template-based answer composition.

use async_trait::async_trait;

use pmpai_core::error::Result;
use pmpai_core::traits::AnswerComposer;
use pmpai_core::types::SearchHit;

/// Deterministic string-templating composer, the reference stand-in for
/// the LLM adapter in `pmpai-providers`. Assembles the top sources into a
/// readable digest without any generation step.
pub struct TemplateComposer {
    excerpt_chars: usize,
}

impl Default for TemplateComposer {
    fn default() -> Self {
        Self { excerpt_chars: 160 }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{cut}…")
}

#[async_trait]
impl AnswerComposer for TemplateComposer {
    fn name(&self) -> &str {
        "template"
    }

    async fn compose(&self, question: &str, sources: &[SearchHit]) -> Result<String> {
        if sources.is_empty() {
            return Ok(format!(
                "No relevant documents were found for \"{question}\". \
                 Try uploading project documents or broadening the filter."
            ));
        }

        let mut answer = format!(
            "Based on {} relevant source(s) for \"{question}\":\n",
            sources.len()
        );
        for (i, hit) in sources.iter().enumerate() {
            answer.push_str(&format!(
                "\n{}. [{}] {}",
                i + 1,
                hit.title,
                truncate_chars(&hit.excerpt, self.excerpt_chars)
            ));
        }
        Ok(answer)
    }
}
