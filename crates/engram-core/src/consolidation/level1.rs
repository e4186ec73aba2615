//! [C10] Level 1 — duplicate merging by cosine similarity. Grounded in
//! `original_source/MEMORY_SYSTEM/consolidation_and_canonicalization/
//! consolidate_memories.py`'s `consolidate_memories`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::embeddings::cosine_similarity;
use crate::memory::MemoryKind;
use crate::storage::{Storage, StorageError};

/// Cosine-similarity floor for two factual memories to be considered
/// duplicates (spec section 4.4 default).
pub const L1_SIMILARITY_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone)]
pub struct MergeDetail {
    pub canonical_id: String,
    pub merged_count: usize,
    pub category: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConsolidationResult {
    pub merged: usize,
    pub details: Vec<MergeDetail>,
}

/// Merge near-duplicate active factual memories for `user_id`. Candidates
/// restricted to the same `category` (the teacher's `memory_type`
/// partition); `topic` is left to level 2.
pub fn consolidate(storage: &Storage, user_id: &str) -> Result<ConsolidationResult, StorageError> {
    let candidates = storage.list_active_for_consolidation(user_id, MemoryKind::Factual)?;
    if candidates.len() < 2 {
        return Ok(ConsolidationResult::default());
    }

    let mut visited: HashSet<String> = HashSet::new();
    let mut result = ConsolidationResult::default();

    for base in &candidates {
        if visited.contains(&base.memory_id) {
            continue;
        }
        let Some(base_embedding) = &base.embedding else {
            continue;
        };

        let peers: Vec<&crate::memory::Memory> = candidates
            .iter()
            .filter(|m| {
                m.memory_id != base.memory_id
                    && !visited.contains(&m.memory_id)
                    && m.category == base.category
                    && m.embedding.as_ref().is_some_and(|e| {
                        cosine_similarity(base_embedding, e) as f64 >= L1_SIMILARITY_THRESHOLD
                    })
            })
            .collect();

        if peers.is_empty() {
            continue;
        }

        let mut group: Vec<&crate::memory::Memory> = vec![base];
        group.extend(peers);

        let canonical = *group
            .iter()
            .max_by(|a, b| consolidation_key(a).partial_cmp(&consolidation_key(b)).unwrap())
            .expect("group is non-empty");
        let canonical_id = canonical.memory_id.clone();

        let merged_ids: Vec<String> =
            group.iter().map(|m| m.memory_id.clone()).filter(|id| *id != canonical_id).collect();

        if merged_ids.is_empty() {
            continue;
        }

        storage.bump_evidence_count(&canonical_id, merged_ids.len() as i64)?;
        for id in &merged_ids {
            storage.update_memory_status(id, crate::memory::MemoryStatus::Merged)?;
        }

        visited.insert(canonical_id.clone());
        visited.extend(merged_ids.iter().cloned());
        result.merged += merged_ids.len();
        result.details.push(MergeDetail {
            canonical_id,
            merged_count: merged_ids.len(),
            category: canonical.category.clone(),
        });
    }

    Ok(result)
}

/// `(confidence_score, evidence_count, last_seen_at)` canonical-selection
/// tuple (spec section 4.4). `last_accessed` stands in for `last_seen_at`.
fn consolidation_key(m: &crate::memory::Memory) -> (f64, i64, DateTime<Utc>) {
    (m.confidence_score, m.evidence_count, m.last_accessed.unwrap_or(m.last_updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ConfidenceSource, Memory, MemoryStatus};

    fn memory_with(user_id: &str, category: &str, embedding: Vec<f32>, confidence: f64, evidence: i64) -> Memory {
        let now = Utc::now();
        Memory {
            memory_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            memory_kind: MemoryKind::Factual,
            category: category.to_string(),
            topic: "lang".to_string(),
            fact: "User prefers Rust".to_string(),
            importance: 1.0,
            confidence_score: confidence,
            confidence_source: ConfidenceSource::Explicit,
            frequency: 1,
            evidence_count: evidence,
            status: MemoryStatus::Active,
            embedding: Some(embedding),
            metadata: serde_json::json!({}),
            expires_at: None,
            created_at: now,
            last_updated: now,
            last_accessed: None,
        }
    }

    #[test]
    fn near_duplicates_merge_into_strongest_canonical() {
        let storage = Storage::open_in_memory().expect("open");
        let weaker = memory_with("u1", "technical_context", vec![1.0, 0.0, 0.0], 0.7, 1);
        let stronger = memory_with("u1", "technical_context", vec![0.99, 0.14, 0.0], 0.95, 3);
        storage.insert_memory(&weaker).expect("insert weaker");
        storage.insert_memory(&stronger).expect("insert stronger");

        let result = consolidate(&storage, "u1").expect("consolidate");
        assert_eq!(result.merged, 1);
        assert_eq!(result.details[0].canonical_id, stronger.memory_id);

        let merged_row = storage.get_memory(&weaker.memory_id).expect("get").expect("present");
        assert_eq!(merged_row.status, MemoryStatus::Merged);

        let canonical_row = storage.get_memory(&stronger.memory_id).expect("get").expect("present");
        assert_eq!(canonical_row.evidence_count, 4);
    }

    #[test]
    fn dissimilar_memories_are_left_alone() {
        let storage = Storage::open_in_memory().expect("open");
        storage.insert_memory(&memory_with("u1", "technical_context", vec![1.0, 0.0, 0.0], 0.9, 1)).expect("insert");
        storage.insert_memory(&memory_with("u1", "technical_context", vec![0.0, 1.0, 0.0], 0.9, 1)).expect("insert");

        let result = consolidate(&storage, "u1").expect("consolidate");
        assert_eq!(result.merged, 0);
    }
}
