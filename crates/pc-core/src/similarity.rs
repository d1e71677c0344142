//! Vector maths for semantic similarity scoring.

use crate::traits::{Embedder, SimilarityScorer};
use anyhow::bail;

/// Dot product of two vectors.
#[inline]
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity in [-1, 1]; 0.0 when either vector is zero.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot = inner_product(a, b);
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// L2-normalize in place. Zero vectors are left untouched.
pub fn normalize_vector(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Scores similarity as the cosine of normalized embeddings.
pub struct EmbeddingSimilarity<E> {
    embedder: E,
}

impl<E: Embedder> EmbeddingSimilarity<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}

impl<E: Embedder> SimilarityScorer for EmbeddingSimilarity<E> {
    fn similarity(&self, a: &str, b: &str) -> anyhow::Result<f32> {
        let mut va = self.embedder.embed(a)?;
        let mut vb = self.embedder.embed(b)?;
        if va.len() != vb.len() {
            bail!("embedding dimension mismatch: {} vs {}", va.len(), vb.len());
        }
        normalize_vector(&mut va);
        normalize_vector(&mut vb);
        Ok(inner_product(&va, &vb).clamp(-1.0, 1.0))
    }
}
