//! [C12] Retriever: query chunking, embedding-based intent classification,
//! and hybrid episodic/factual retrieval (spec section 4.6).

pub mod chunk;
pub mod hybrid;
pub mod intent;

pub use chunk::chunk_query;
pub use hybrid::{retrieve_episodic, retrieve_factual, RetrievalResult, DEFAULT_EPISODIC_LIMIT};
pub use intent::{Intent, IntentClassifier};

use crate::embeddings::EmbeddingProvider;
use crate::storage::{Storage, StorageError};

/// Full retrieval pipeline for one user turn. Chunks the query, classifies
/// its intent, then retrieves episodic rows unconditionally and factual
/// rows gated on there being at least one usable chunk.
pub fn retrieve(
    storage: &Storage,
    embedder: &dyn EmbeddingProvider,
    classifier: &IntentClassifier,
    user_id: &str,
    query: &str,
) -> Result<RetrievalResult, StorageError> {
    let chunks = chunk_query(query);
    if chunks.is_empty() {
        return Ok(RetrievalResult::default());
    }

    let intent = classifier.classify(query, embedder).unwrap_or(Intent::Minimal);
    let episodic = retrieve_episodic(storage, user_id, &chunks, DEFAULT_EPISODIC_LIMIT)?;
    let factual = retrieve_factual(storage, embedder, user_id, &chunks, &episodic, intent)?;

    Ok(RetrievalResult { episodic, factual })
}
