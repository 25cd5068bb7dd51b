// crates/nlu/src/tfidf.rs

//! Word-level TF-IDF vectorizer over unigrams and bigrams.
//!
//! Tokens are runs of at least two alphanumeric characters. The vocabulary is
//! capped at `max_features` terms, keeping the most frequent terms across the
//! training corpus. IDF is smoothed (`ln((1 + n) / (1 + df)) + 1`) and every
//! vector is L2-normalised.

use std::collections::{BTreeMap, HashMap, HashSet};

use aari_core::{AariError, AariResult};

/// Sparse feature vector: `(feature index, weight)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    term_to_idx: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns the vocabulary and IDF weights from `corpus`.
    pub fn fit(corpus: &[&str], max_features: usize) -> AariResult<Self> {
        if corpus.is_empty() {
            return Err(AariError::Nlu("Cannot fit TF-IDF on an empty corpus".to_string()));
        }
        if max_features == 0 {
            return Err(AariError::Nlu("max_features must be positive".to_string()));
        }

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in corpus {
            let terms = analyze(doc);
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term.to_string()).or_insert(0) += 1;
            }
            for term in terms {
                *term_counts.entry(term).or_insert(0) += 1;
            }
        }

        if term_counts.is_empty() {
            return Err(AariError::Nlu(
                "Training corpus produced an empty vocabulary".to_string(),
            ));
        }

        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        // Feature indices follow lexical order of the retained terms.
        let retained: BTreeMap<String, usize> = ranked
            .into_iter()
            .map(|(term, _)| {
                let df = doc_freq.get(&term).copied().unwrap_or(1);
                (term, df)
            })
            .collect();

        let num_docs = corpus.len() as f64;
        let mut term_to_idx = HashMap::with_capacity(retained.len());
        let mut idf = Vec::with_capacity(retained.len());
        for (idx, (term, df)) in retained.into_iter().enumerate() {
            idf.push(((1.0 + num_docs) / (1.0 + df as f64)).ln() + 1.0);
            term_to_idx.insert(term, idx);
        }

        Ok(Self { term_to_idx, idf })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.term_to_idx.contains_key(term)
    }

    /// Vectorizes `text` with the fitted vocabulary. Out-of-vocabulary terms
    /// are ignored, so the result may be empty.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(text) {
            if let Some(&idx) = self.term_to_idx.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(idx, count)| (idx, count * self.idf[idx]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut vector {
                *weight /= norm;
            }
        }

        vector
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Unigrams followed by bigrams.
fn analyze(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = tokens.clone();
    terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_drops_single_characters_and_punctuation() {
        assert_eq!(tokenize("What's up, a-OK?"), vec!["what", "up", "ok"]);
    }

    #[test]
    fn analyzer_emits_unigrams_then_bigrams() {
        assert_eq!(
            analyze("call my mom"),
            vec!["call", "my", "mom", "call my", "my mom"]
        );
    }

    #[test]
    fn vocabulary_respects_max_features() {
        let corpus = ["call mom", "call dad", "play music", "play song now"];
        let vectorizer = TfidfVectorizer::fit(&corpus, 3).unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 3);
        // "call" and "play" are the most frequent terms.
        assert!(vectorizer.contains("call"));
        assert!(vectorizer.contains("play"));
    }

    #[test]
    fn vectors_are_unit_length() {
        let corpus = ["call mom", "call dad", "play music"];
        let vectorizer = TfidfVectorizer::fit(&corpus, 500).unwrap();
        let v = vectorizer.transform("call mom now");
        let norm: f64 = v.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unseen_text_transforms_to_empty_vector() {
        let corpus = ["call mom"];
        let vectorizer = TfidfVectorizer::fit(&corpus, 500).unwrap();
        assert!(vectorizer.transform("zebra xylophone").is_empty());
    }

    #[test]
    fn rejects_degenerate_input() {
        assert!(TfidfVectorizer::fit(&[], 10).is_err());
        assert!(TfidfVectorizer::fit(&["a b c"], 10).is_err());
        assert!(TfidfVectorizer::fit(&["call mom"], 0).is_err());
    }
}
