//! TF-IDF feature extraction over unigrams and bigrams.
//!
//! Two-phase contract: [`TfidfVectorizer::fit`] freezes a bounded
//! vocabulary plus document-frequency statistics over a training corpus,
//! then [`TfidfVectorizer::transform`] maps arbitrary text onto that
//! frozen vocabulary. Out-of-vocabulary terms get zero weight, never an
//! error. Refitting the same corpus reproduces the same vocabulary:
//! selection ties are broken by lexical order of the term.

use crate::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Vocabulary cap used when no override is configured.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Tokens removed before n-gram generation.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being",
    "below", "between", "both", "but", "by", "can", "could", "did", "do",
    "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "him", "his", "how", "if", "in", "into", "is", "it", "its", "just",
    "me", "more", "most", "my", "no", "nor", "not", "now", "of", "off",
    "on", "once", "only", "or", "other", "our", "out", "over", "own",
    "same", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "you", "your",
];

/// Sparse numeric vector over a fixed feature space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    /// Feature indices with nonzero weight, sorted ascending.
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
    pub dim: usize,
}

impl SparseVector {
    pub fn zeros(dim: usize) -> Self {
        Self { indices: Vec::new(), values: Vec::new(), dim }
    }

    /// Weight at `feature`, zero when absent.
    pub fn get(&self, feature: usize) -> f64 {
        match self.indices.binary_search(&feature) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }
}

/// Frequency-weighted n-gram vectorizer with a bounded, pre-fit vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    /// term -> feature index; indices are assigned in lexical term order.
    vocabulary: HashMap<String, usize>,
    /// Smoothed inverse document frequency per feature index.
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features: max_features.max(1),
            vocabulary: HashMap::new(),
            idf: Vec::new(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.idf.is_empty()
    }

    /// Dimensionality of the fitted feature space.
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    /// Build the vocabulary and document-frequency statistics from a
    /// training corpus. Both are frozen after this call.
    pub fn fit(&mut self, corpus: &[String]) -> Result<()> {
        if corpus.is_empty() {
            return Err(DispatchError::Dataset(
                "cannot fit vectorizer on an empty corpus".to_string(),
            ));
        }

        let mut term_count: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, u64> = HashMap::new();

        for doc in corpus {
            let terms = extract_terms(doc);
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &terms {
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
            for term in terms {
                *term_count.entry(term).or_insert(0) += 1;
            }
        }

        if term_count.is_empty() {
            return Err(DispatchError::EmptyVocabulary);
        }

        // Top-K by corpus frequency; ties broken by lexical order so the
        // fitted vocabulary is reproducible.
        let mut candidates: Vec<(String, u64)> = term_count.into_iter().collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(self.max_features);

        // Stable index assignment: lexical order over the selected terms.
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = corpus.len() as f64;
        self.vocabulary.clear();
        self.idf = Vec::with_capacity(candidates.len());
        for (index, (term, _)) in candidates.into_iter().enumerate() {
            let df = doc_freq.get(&term).copied().unwrap_or(0) as f64;
            self.idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            self.vocabulary.insert(term, index);
        }
        Ok(())
    }

    /// Map text onto the frozen vocabulary: term frequency × IDF,
    /// L2-normalized. Out-of-vocabulary terms are dropped.
    pub fn transform(&self, text: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(DispatchError::NotFitted);
        }

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in extract_terms(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }
        if counts.is_empty() {
            return Ok(SparseVector::zeros(self.dim()));
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        entries.sort_by_key(|(index, _)| *index);

        let norm = entries
            .iter()
            .map(|(_, w)| w * w)
            .sum::<f64>()
            .sqrt();
        let (indices, values) = entries
            .into_iter()
            .map(|(index, w)| (index, w / norm))
            .unzip();

        Ok(SparseVector { indices, values, dim: self.dim() })
    }
}

/// Lowercase word tokens: split on non-alphanumeric, drop single-character
/// tokens and stop words.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 1)
        .filter(|token| !STOP_WORDS.contains(token))
        .map(|token| token.to_string())
        .collect()
}

/// Unigrams plus bigrams of adjacent surviving tokens.
fn extract_terms(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut terms = Vec::with_capacity(tokens.len() * 2);
    for window in tokens.windows(2) {
        terms.push(format!("{} {}", window[0], window[1]));
    }
    terms.extend(tokens);
    terms
}
