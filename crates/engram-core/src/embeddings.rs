//! [C1] Embedding Provider — trait only, per spec section 1's "external
//! collaborators" list. Cosine/normalize helpers are grounded on the
//! teacher's `embeddings::local` math, kept near-verbatim since it's pure
//! arithmetic independent of which model produced the vector.

use crate::EMBEDDING_DIMENSIONS;

/// Embedding provider error.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Maps text to a unit-normalized vector. The real implementation (a hosted
/// or local embedding model) lives outside this crate; callers inject it.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Width of vectors this provider returns. `Storage` rejects any
    /// embedding where this doesn't equal [`EMBEDDING_DIMENSIONS`].
    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }
}

/// Deterministic, dependency-free embedding provider used as the default
/// when no real model is configured, and in tests. Projects a bag of hashed
/// tokens onto a fixed-width vector and L2-normalizes it — stable across
/// runs, cheap, and good enough to exercise dedup/retrieval logic without a
/// network call.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: EMBEDDING_DIMENSIONS,
        }
    }
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }

        let mut vector = vec![0f32; self.dimensions];
        for token in text.split_whitespace() {
            let token = token.to_lowercase();
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            std::hash::Hash::hash(&token, &mut hasher);
            let h = std::hash::Hasher::finish(&hasher);
            let idx = (h as usize) % self.dimensions;
            // Sign bit derived from a second hash round so a token's
            // contribution isn't always positive (reduces collisions
            // collapsing to an all-positive vector).
            let sign = if (h >> 1) & 1 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        Ok(normalize(&vector))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// L2-normalize a vector in place, returning a zero vector unchanged if its
/// norm is (near) zero.
pub fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = (vector.iter().map(|v| v * v).sum::<f32>()).sqrt();
    if norm < f32::EPSILON {
        return vector.to_vec();
    }
    vector.iter().map(|v| v / norm).collect()
}

/// Cosine similarity between two equal-length vectors. Returns `0.0` on
/// dimension mismatch rather than panicking, matching the teacher's
/// `Embedding::cosine_similarity` defensive behavior.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = (a.iter().map(|v| v * v).sum::<f32>()).sqrt();
    let norm_b = (b.iter().map(|v| v * v).sum::<f32>()).sqrt();
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Cosine distance — `1 - cosine_similarity` — used by the LTM writer's
/// semantic dedup check and the consolidator's merge threshold.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Mean-pool a set of embeddings into one vector, re-normalized. Used to
/// compile the retriever's fixed intent prototypes from template strings.
pub fn mean_pool(vectors: &[Vec<f32>]) -> Vec<f32> {
    if vectors.is_empty() {
        return Vec::new();
    }
    let dims = vectors[0].len();
    let mut sum = vec![0f32; dims];
    for v in vectors {
        for (i, x) in v.iter().enumerate() {
            if i < dims {
                sum[i] += x;
            }
        }
    }
    let n = vectors.len() as f32;
    for x in sum.iter_mut() {
        *x /= n;
    }
    normalize(&sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_embedder_is_deterministic() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("the mitochondria is the powerhouse").unwrap();
        let b = embedder.embed("the mitochondria is the powerhouse").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), EMBEDDING_DIMENSIONS);
    }

    #[test]
    fn identical_text_has_similarity_one() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("prefers rust over python").unwrap();
        let b = embedder.embed("prefers rust over python").unwrap();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn different_text_is_less_similar() {
        let embedder = HashingEmbedder::default();
        let a = embedder.embed("prefers rust over python").unwrap();
        let b = embedder.embed("likes hiking on weekends").unwrap();
        assert!(cosine_similarity(&a, &b) < 0.9);
    }

    #[test]
    fn empty_input_is_rejected() {
        let embedder = HashingEmbedder::default();
        assert!(embedder.embed("   ").is_err());
    }

    #[test]
    fn mean_pool_is_unit_normalized() {
        let embedder = HashingEmbedder::default();
        let vectors = vec![
            embedder.embed("alpha beta").unwrap(),
            embedder.embed("gamma delta").unwrap(),
        ];
        let pooled = mean_pool(&vectors);
        let norm = (pooled.iter().map(|v| v * v).sum::<f32>()).sqrt();
        assert!((norm - 1.0).abs() < 1e-3 || norm == 0.0);
    }
}
