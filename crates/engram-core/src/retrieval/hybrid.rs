//! Hybrid factual/episodic scoring and per-intent category caps (spec
//! section 4.6). The weighted-combination shape is grounded on
//! `vestige-core/src/search/hybrid.rs`'s `linear_combination`/
//! `reciprocal_rank_fusion` helpers, generalized from a (keyword, semantic)
//! pair to this crate's (topic-match, distance, importance, confidence,
//! episodic-boost) terms — there's no separate keyword index here, so the
//! "ranks" being fused are the term scores themselves rather than two
//! independent result lists.

use std::collections::{HashMap, HashSet};

use crate::embeddings::{cosine_distance, EmbeddingProvider};
use crate::memory::Memory;
use crate::retrieval::intent::Intent;
use crate::storage::{Storage, StorageError};

pub const MIN_FACTUAL_CONFIDENCE: f64 = 0.65;
pub const TOPIC_QUALIFY_DISTANCE: f32 = 1.05;
pub const EPISODIC_BOOST: f64 = 1.5;
pub const EPISODIC_BOOST_MIN_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_EPISODIC_LIMIT: usize = 10;
pub const DEFAULT_CATEGORY_CAP: usize = 1;

#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub episodic: Vec<Memory>,
    pub factual: Vec<Memory>,
}

/// Load every active, non-expired episodic row for `user_id`, newest first;
/// if `chunks` is non-empty, reorder by an advisory substring-overlap score
/// that never gates inclusion, only sort order. Episodic rows never compete
/// with factual rows for a slot (spec section 8, invariant 6).
pub fn retrieve_episodic(storage: &Storage, user_id: &str, chunks: &[String], limit: usize) -> Result<Vec<Memory>, StorageError> {
    let mut rows = storage.list_active_episodic(user_id)?;
    if !chunks.is_empty() {
        rows.sort_by(|a, b| {
            advisory_overlap(b, chunks)
                .cmp(&advisory_overlap(a, chunks))
                .then_with(|| b.confidence_score.partial_cmp(&a.confidence_score).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
    }
    rows.truncate(limit);
    Ok(rows)
}

fn advisory_overlap(memory: &Memory, chunks: &[String]) -> usize {
    let fact_lower = memory.fact.to_lowercase();
    chunks.iter().filter(|c| fact_lower.contains(&c.to_lowercase())).count()
}

/// For each chunk, embed it and scan active/supporting factual rows at or
/// above [`MIN_FACTUAL_CONFIDENCE`]. A row qualifies once per `(category,
/// topic)` pair (first occurrence wins) when its topic token is in the
/// query's token set or its embedding distance is within
/// [`TOPIC_QUALIFY_DISTANCE`]; qualifying rows are scored, ranked, then
/// capped per category by `intent`.
pub fn retrieve_factual(
    storage: &Storage,
    embedder: &dyn EmbeddingProvider,
    user_id: &str,
    chunks: &[String],
    episodic: &[Memory],
    intent: Intent,
) -> Result<Vec<Memory>, StorageError> {
    if chunks.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = storage.list_retrievable_factual(user_id, MIN_FACTUAL_CONFIDENCE, true)?;
    let tokens = query_tokens(chunks);

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut scored: Vec<(f64, Memory)> = Vec::new();

    for chunk in chunks {
        let embedding = match embedder.embed(chunk) {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(error = %err, chunk = %chunk, "skipping chunk after embedding failure during retrieval");
                continue;
            }
        };

        for memory in &candidates {
            let key = (memory.category.clone(), memory.topic.clone());
            if seen.contains(&key) {
                continue;
            }
            let Some(memory_embedding) = memory.embedding.as_ref() else {
                continue;
            };

            let distance = cosine_distance(&embedding, memory_embedding);
            let topic_match = tokens.contains(&memory.topic.to_lowercase());
            if !topic_match && distance > TOPIC_QUALIFY_DISTANCE {
                continue;
            }

            seen.insert(key);
            scored.push((score_candidate(memory, distance, topic_match, episodic), memory.clone()));
        }
    }

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    Ok(apply_category_caps(scored, intent))
}

fn query_tokens(chunks: &[String]) -> HashSet<String> {
    chunks
        .iter()
        .flat_map(|c| c.split_whitespace())
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn score_candidate(memory: &Memory, distance: f32, topic_match: bool, episodic: &[Memory]) -> f64 {
    let topic_term = if topic_match { 2.0 } else { 0.0 };
    let distance_term = (1.0 - distance.min(1.0)) as f64;
    let importance_term = memory.importance / 10.0;
    let confidence_term = memory.confidence_score;
    let episodic_boost = if has_episodic_support(memory, episodic) { EPISODIC_BOOST } else { 0.0 };
    topic_term + distance_term + importance_term + confidence_term + episodic_boost
}

fn has_episodic_support(memory: &Memory, episodic: &[Memory]) -> bool {
    let fact_lower = memory.fact.to_lowercase();
    episodic
        .iter()
        .any(|e| e.confidence_score >= EPISODIC_BOOST_MIN_CONFIDENCE && fact_lower.contains(&e.fact.to_lowercase()))
}

fn category_cap_table(intent: Intent) -> HashMap<&'static str, usize> {
    match intent {
        Intent::Exploratory => {
            HashMap::from([("technical_context", 3), ("problem_domain", 3), ("constraint", 2), ("preference", 1)])
        }
        Intent::Focused => HashMap::from([("technical_context", 2), ("problem_domain", 1), ("constraint", 1)]),
        Intent::Minimal => HashMap::from([("technical_context", 1), ("constraint", 1)]),
    }
}

fn apply_category_caps(scored: Vec<(f64, Memory)>, intent: Intent) -> Vec<Memory> {
    let caps = category_cap_table(intent);
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut result = Vec::new();
    for (_, memory) in scored {
        let cap = caps.get(memory.category.as_str()).copied().unwrap_or(DEFAULT_CATEGORY_CAP);
        let count = counts.entry(memory.category.clone()).or_insert(0);
        if *count >= cap {
            continue;
        }
        *count += 1;
        result.push(memory);
    }
    result
}
