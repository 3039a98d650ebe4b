//! Deterministic stub implementations of the enrichment ports.
//!
//! The production system calls an LLM for summaries and tag suggestions;
//! these stand-ins keep uploads working offline and give tests stable
//! output. Swapped at wiring time, never by environment branching.

use std::collections::HashMap;

use async_trait::async_trait;

use pmpai_core::error::Result;
use pmpai_core::traits::{Summarizer, Tagger};

use crate::chunker::SENTENCE_ENDERS;

/// Takes the leading sentences of the text, up to a character budget.
pub struct ExtractiveSummarizer {
    max_chars: usize,
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self { max_chars: 200 }
    }
}

impl ExtractiveSummarizer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let mut out = String::new();
        let mut count = 0usize;
        for ch in text.trim().chars() {
            out.push(ch);
            count += 1;
            // Stop at the first sentence end once past the budget
            if count >= self.max_chars && SENTENCE_ENDERS.contains(&ch) {
                break;
            }
            if count >= self.max_chars * 2 {
                break;
            }
        }
        Ok(out.trim().to_string())
    }
}

/// Ranks whitespace-separated tokens by frequency. A placeholder for the
/// LLM tagger. CJK text without whitespace gets few or no tags, which is
/// acceptable for a stub.
pub struct KeywordTagger {
    min_token_len: usize,
}

impl Default for KeywordTagger {
    fn default() -> Self {
        Self { min_token_len: 4 }
    }
}

#[async_trait]
impl Tagger for KeywordTagger {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn tag(&self, text: &str, max_tags: usize) -> Result<Vec<String>> {
        let mut freq: HashMap<String, usize> = HashMap::new();
        for token in text.split(|c: char| !c.is_alphanumeric()) {
            let token = token.to_lowercase();
            if token.chars().count() >= self.min_token_len {
                *freq.entry(token).or_default() += 1;
            }
        }
        let mut ranked: Vec<(String, usize)> = freq.into_iter().collect();
        // Frequency first, then lexicographic so output is deterministic
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked.into_iter().take(max_tags).map(|(t, _)| t).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_summary_is_prefix() {
        let s = ExtractiveSummarizer::new(20);
        let text = "First sentence here. Second sentence follows. Third one.";
        let summary = s.summarize(text).await.unwrap();
        assert!(text.starts_with(&summary));
        assert!(summary.chars().count() <= 40);
    }

    #[tokio::test]
    async fn test_short_text_summary_is_whole_text() {
        let s = ExtractiveSummarizer::default();
        assert_eq!(s.summarize("Short note.").await.unwrap(), "Short note.");
    }

    #[tokio::test]
    async fn test_tagger_ranks_by_frequency() {
        let t = KeywordTagger::default();
        let tags = t
            .tag("risk budget risk schedule risk budget", 2)
            .await
            .unwrap();
        assert_eq!(tags, vec!["risk".to_string(), "budget".to_string()]);
    }

    #[tokio::test]
    async fn test_tagger_deterministic() {
        let t = KeywordTagger::default();
        let a = t.tag("alpha beta alpha gamma beta alpha", 3).await.unwrap();
        let b = t.tag("alpha beta alpha gamma beta alpha", 3).await.unwrap();
        assert_eq!(a, b);
    }
}
