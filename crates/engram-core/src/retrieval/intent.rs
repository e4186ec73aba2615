//! Embedding-based intent classification (spec section 4.6): the query's
//! retrieval intent is whichever of three fixed prototypes it's closest to,
//! each prototype a mean-pool of template strings computed once at startup.

use crate::embeddings::{cosine_similarity, mean_pool, EmbeddingError, EmbeddingProvider};

/// Below this similarity to every prototype, the query carries too weak a
/// signal to trust and classification falls back to [`Intent::Minimal`].
pub const MIN_CONFIDENT_SIMILARITY: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Exploratory,
    Focused,
    Minimal,
}

const EXPLORATORY_TEMPLATES: &[&str] = &[
    "tell me everything you know about this topic",
    "give me broad background and context on this",
    "explore the options and possibilities here",
    "what should I consider across this whole area",
];

const FOCUSED_TEMPLATES: &[&str] = &[
    "what is the exact value of this specific setting",
    "look up the precise detail I asked about",
    "answer this one narrow question directly",
    "give me the specific fact I requested",
];

const MINIMAL_TEMPLATES: &[&str] = &["ok thanks", "yes that works", "got it", "sounds good"];

/// Holds the three prototype vectors so they're computed once per process
/// rather than re-embedded on every query.
pub struct IntentClassifier {
    exploratory: Vec<f32>,
    focused: Vec<f32>,
    minimal: Vec<f32>,
}

impl IntentClassifier {
    pub fn new(embedder: &dyn EmbeddingProvider) -> Result<Self, EmbeddingError> {
        Ok(Self {
            exploratory: mean_pool(&embed_all(embedder, EXPLORATORY_TEMPLATES)?),
            focused: mean_pool(&embed_all(embedder, FOCUSED_TEMPLATES)?),
            minimal: mean_pool(&embed_all(embedder, MINIMAL_TEMPLATES)?),
        })
    }

    pub fn classify(&self, query: &str, embedder: &dyn EmbeddingProvider) -> Result<Intent, EmbeddingError> {
        let embedded = embedder.embed(query)?;
        let scores = [
            (Intent::Exploratory, cosine_similarity(&embedded, &self.exploratory)),
            (Intent::Focused, cosine_similarity(&embedded, &self.focused)),
            (Intent::Minimal, cosine_similarity(&embedded, &self.minimal)),
        ];
        let (best_intent, best_score) = scores
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .expect("scores has three entries");

        if best_score < MIN_CONFIDENT_SIMILARITY {
            Ok(Intent::Minimal)
        } else {
            Ok(best_intent)
        }
    }
}

fn embed_all(embedder: &dyn EmbeddingProvider, templates: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    templates.iter().map(|t| embedder.embed(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashingEmbedder;

    #[test]
    fn overlapping_vocabulary_classifies_exploratory() {
        let embedder = HashingEmbedder::default();
        let classifier = IntentClassifier::new(&embedder).expect("build classifier");
        let intent = classifier
            .classify("tell me everything you know about this whole broad topic and context", &embedder)
            .expect("classify");
        assert_eq!(intent, Intent::Exploratory);
    }

    #[test]
    fn weak_similarity_to_every_prototype_falls_back_to_minimal() {
        let embedder = HashingEmbedder::default();
        let classifier = IntentClassifier::new(&embedder).expect("build classifier");
        let intent = classifier.classify("xyzzy plugh quux wibble", &embedder).expect("classify");
        assert_eq!(intent, Intent::Minimal);
    }
}
