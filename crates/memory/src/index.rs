//! In-process vector index backing the `rag_upsert_url` / `rag_search` tools.
//!
//! One document per id; upserting an existing id replaces its text and
//! embedding. Like [`KeyValueStore`](crate::KeyValueStore), the index is
//! owned by whoever builds the tool registry and shared as an `Arc`.

use serde::Serialize;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct IndexedDocument {
    id: String,
    text: String,
    embedding: Vec<f32>,
}

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexMatch {
    pub id: String,
    pub score: f64,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct VectorIndex {
    documents: RwLock<Vec<IndexedDocument>>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, or replace the one with the same id.
    /// Returns `true` when an existing document was replaced.
    pub fn upsert(&self, id: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> bool {
        let document = IndexedDocument {
            id: id.into(),
            text: text.into(),
            embedding,
        };
        let mut documents = self.documents.write().unwrap_or_else(|e| e.into_inner());
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => {
                *existing = document;
                true
            }
            None => {
                documents.push(document);
                false
            }
        }
    }

    /// The `k` documents most similar to `query`, best first, each with at
    /// most `excerpt_chars` characters of text. Ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize, excerpt_chars: usize) -> Vec<IndexMatch> {
        let documents = self.documents.read().unwrap_or_else(|e| e.into_inner());
        let mut scored: Vec<(f64, &IndexedDocument)> = documents
            .iter()
            .map(|d| (cosine_similarity(query, &d.embedding), d))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(k)
            .map(|(score, d)| IndexMatch {
                id: d.id.clone(),
                score,
                text: d.text.chars().take(excerpt_chars).collect(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cosine similarity in f64. Zero vectors and length mismatches score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
