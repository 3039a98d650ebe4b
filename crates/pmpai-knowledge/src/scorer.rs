//! Hybrid relevance scoring.
//!
//! Cosine similarity between query and item vectors is the base score;
//! exact case-insensitive substring hits on the item's title, summary, or
//! tags add fixed bonuses on top. Pure vector similarity is noisy for
//! short queries, so lexical hits are rewarded explicitly. The final score
//! is the unweighted sum; ties are broken by the caller's stable sort.

use pmpai_core::config::ScoringConfig;

/// Cosine similarity. Returns 0.0 for mismatched dimensions or zero-norm
/// vectors rather than propagating an error; such pairs are simply not
/// comparable and should never outrank a real match.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// The item-side text fields the lexical boost inspects.
#[derive(Debug, Clone, Copy)]
pub struct LexicalFields<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub tags: &'a [String],
}

/// Boost weights, loaded from `[scoring]` config.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub title_boost: f32,
    pub summary_boost: f32,
    pub tag_boost: f32,
}

impl From<&ScoringConfig> for ScoringWeights {
    fn from(cfg: &ScoringConfig) -> Self {
        Self {
            title_boost: cfg.title_boost,
            summary_boost: cfg.summary_boost,
            tag_boost: cfg.tag_boost,
        }
    }
}

impl ScoringWeights {
    /// Base cosine plus lexical bonuses. Each field contributes its boost
    /// at most once, regardless of how many times the query occurs in it.
    pub fn score(
        &self,
        query_vector: &[f32],
        item_vector: &[f32],
        query_text: &str,
        fields: LexicalFields<'_>,
    ) -> f32 {
        let mut score = cosine_similarity(query_vector, item_vector);

        let query = query_text.trim().to_lowercase();
        if query.is_empty() {
            return score;
        }
        if fields.title.to_lowercase().contains(&query) {
            score += self.title_boost;
        }
        if fields.summary.to_lowercase().contains(&query) {
            score += self.summary_boost;
        }
        if fields.tags.iter().any(|t| t.to_lowercase().contains(&query)) {
            score += self.tag_boost;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> ScoringWeights {
        ScoringWeights::from(&ScoringConfig::default())
    }

    const NO_MATCH: LexicalFields<'static> = LexicalFields {
        title: "other",
        summary: "other",
        tags: &[],
    };

    #[test]
    fn test_cosine_identical_is_one() {
        let v = vec![0.3, -0.5, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_mismatched_dims_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_title_match_adds_exactly_title_boost() {
        let w = weights();
        let qv = vec![1.0, 0.0];
        let iv = vec![0.6, 0.8];
        let base = w.score(&qv, &iv, "风险管理", NO_MATCH);
        let boosted = w.score(
            &qv,
            &iv,
            "风险管理",
            LexicalFields {
                title: "2026年风险管理计划",
                summary: "other",
                tags: &[],
            },
        );
        assert!((boosted - base - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_case_insensitive_match() {
        let w = weights();
        let v = vec![1.0];
        let s = w.score(
            &v,
            &v,
            "RISK Plan",
            LexicalFields {
                title: "quarterly risk plan",
                summary: "",
                tags: &[],
            },
        );
        assert!((s - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_all_boosts_stack() {
        let w = weights();
        let v = vec![1.0];
        let tags = vec!["risk".to_string()];
        let s = w.score(
            &v,
            &v,
            "risk",
            LexicalFields {
                title: "risk register",
                summary: "the risk summary",
                tags: &tags,
            },
        );
        // 1.0 cosine + 0.2 + 0.1 + 0.1
        assert!((s - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_identical_inputs_identical_score() {
        let w = weights();
        let qv = vec![0.2, 0.4, 0.1];
        let iv = vec![0.3, 0.1, 0.9];
        let f = LexicalFields {
            title: "schedule baseline",
            summary: "",
            tags: &[],
        };
        assert_eq!(
            w.score(&qv, &iv, "baseline", f),
            w.score(&qv, &iv, "baseline", f)
        );
    }

    #[test]
    fn test_empty_query_gets_no_boost() {
        let w = weights();
        let v = vec![1.0];
        let s = w.score(
            &v,
            &v,
            "   ",
            LexicalFields {
                title: "anything",
                summary: "anything",
                tags: &[],
            },
        );
        assert!((s - 1.0).abs() < 1e-6);
    }
}
