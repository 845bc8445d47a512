//! Input-signature extraction and pattern similarity.
//!
//! Two requests are "the same situation" when their keyword sets overlap
//! enough (Jaccard) and they land on the same coarse category. Both the
//! threshold and the stopword list are configuration because they directly
//! control learning precision/recall.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Configuration for signature extraction and pattern matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Similarity at or above this value counts as the same pattern.
    pub same_pattern_threshold: f64,
    /// Weight of keyword-set Jaccard similarity.
    pub keyword_weight: f64,
    /// Weight of coarse-category exact match.
    pub category_weight: f64,
    /// Tokens ignored during keyword extraction.
    pub stopwords: Vec<String>,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            same_pattern_threshold: 0.7,
            keyword_weight: 0.7,
            category_weight: 0.3,
            stopwords: [
                "de", "da", "do", "das", "dos", "em", "no", "na", "nos", "nas", "para", "por",
                "com", "sem", "um", "uma", "a", "o", "e", "ou", "ref", "cia", "ltda", "me",
                "eireli", "sa",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl SimilarityConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.same_pattern_threshold = threshold;
        self
    }

    pub fn with_stopwords(mut self, stopwords: Vec<String>) -> Self {
        self.stopwords = stopwords;
        self
    }
}

/// Lowercase, fold common Portuguese diacritics and replace punctuation with
/// spaces. Deterministic; no locale tables.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        let folded = match lower {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            lc if lc.is_alphanumeric() => lc,
            _ => ' ',
        };
        out.push(folded);
    }
    // Collapse runs of whitespace.
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the keyword set of a free-text description.
///
/// Single-character tokens and pure digit runs carry no signal (dates,
/// document numbers) and are dropped along with stopwords.
pub fn extract_keywords(text: &str, config: &SimilarityConfig) -> BTreeSet<String> {
    normalize_text(text)
        .split_whitespace()
        .filter(|t| t.chars().count() > 1)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !config.stopwords.iter().any(|s| s == t))
        .map(str::to_string)
        .collect()
}

/// Build the canonical signature string: sorted keywords joined by spaces.
///
/// `BTreeSet` ordering makes this stable across runs, so signatures can be
/// persisted and compared verbatim.
pub fn build_signature(text: &str, config: &SimilarityConfig) -> String {
    extract_keywords(text, config)
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Jaccard similarity of two keyword sets. Empty-vs-empty counts as 0 (an
/// empty signature should never attract matches).
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Combined similarity: keyword Jaccard weighted against a coarse-category
/// exact match.
pub fn combined_similarity(
    keywords_a: &BTreeSet<String>,
    category_a: Option<&str>,
    keywords_b: &BTreeSet<String>,
    category_b: Option<&str>,
    config: &SimilarityConfig,
) -> f64 {
    let kw = jaccard(keywords_a, keywords_b);
    let cat = match (category_a, category_b) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    };
    kw * config.keyword_weight + cat * config.category_weight
}

/// Pull the coarse category out of a decision payload, if it has one.
///
/// Tries the known payload keys in preference order.
pub fn coarse_category(payload: &JsonValue) -> Option<&str> {
    for key in ["category", "product", "match", "option"] {
        if let Some(v) = payload.get(key).and_then(JsonValue::as_str) {
            return Some(v);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg() -> SimilarityConfig {
        SimilarityConfig::default()
    }

    #[test]
    fn normalization_folds_accents_and_punctuation() {
        assert_eq!(
            normalize_text("PIX  Ração-Premium, Cão!"),
            "pix racao premium cao"
        );
    }

    #[test]
    fn keywords_drop_stopwords_digits_and_short_tokens() {
        let kws = extract_keywords("pagamento de boleto 12345 a Petz", &cfg());
        let expected: Vec<&str> = vec!["boleto", "pagamento", "petz"];
        assert_eq!(kws.into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn signature_is_sorted_and_stable() {
        let a = build_signature("petz racao premium", &cfg());
        let b = build_signature("premium RACAO petz", &cfg());
        assert_eq!(a, b);
    }

    #[test]
    fn jaccard_of_disjoint_sets_is_zero() {
        let a = extract_keywords("racao gato", &cfg());
        let b = extract_keywords("vacina filhote", &cfg());
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn identical_signature_and_category_is_a_full_match() {
        let kws = extract_keywords("pix petz racao", &cfg());
        let sim = combined_similarity(&kws, Some("alimentacao"), &kws, Some("alimentacao"), &cfg());
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn category_mismatch_caps_similarity_at_keyword_weight() {
        let kws = extract_keywords("pix petz racao", &cfg());
        let sim = combined_similarity(&kws, Some("alimentacao"), &kws, Some("higiene"), &cfg());
        assert!((sim - 0.7).abs() < 1e-9);
    }

    #[test]
    fn coarse_category_prefers_category_key() {
        let payload = json!({"category": "alimentacao", "option": "x"});
        assert_eq!(coarse_category(&payload), Some("alimentacao"));
        assert_eq!(coarse_category(&json!({"note": "y"})), None);
    }
}
