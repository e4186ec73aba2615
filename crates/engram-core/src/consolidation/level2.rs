//! [C10] Level 2 — topic canonicalization. Grounded in
//! `original_source/MEMORY_SYSTEM/consolidation_and_canonicalization/
//! topic_canonicalization.py`'s `canonicalize_topics`.

use std::collections::HashMap;

use crate::memory::{Memory, MemoryKind, MemoryStatus};
use crate::storage::{Storage, StorageError};

#[derive(Debug, Clone)]
pub struct CanonicalizationDetail {
    pub category: String,
    pub topic: String,
    pub canonical_id: String,
    pub supporting_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CanonicalizationResult {
    pub canonicalized: usize,
    pub details: Vec<CanonicalizationDetail>,
}

/// Ensure exactly one active factual memory per `(category, topic)` for
/// `user_id`; demote the rest to `supporting` (non-destructive — spec
/// section 8's "Merge reversibility" law: demoted rows keep all fields
/// needed to restore them to `active`).
pub fn canonicalize(storage: &Storage, user_id: &str) -> Result<CanonicalizationResult, StorageError> {
    let candidates = storage.list_active_for_consolidation(user_id, MemoryKind::Factual)?;

    let mut groups: HashMap<(String, String), Vec<&Memory>> = HashMap::new();
    for memory in &candidates {
        groups.entry((memory.category.clone(), memory.topic.clone())).or_default().push(memory);
    }

    let mut result = CanonicalizationResult::default();

    for ((category, topic), members) in groups {
        if members.len() < 2 {
            continue;
        }

        let canonical = *members
            .iter()
            .max_by(|a, b| consolidation_key(a).partial_cmp(&consolidation_key(b)).unwrap())
            .expect("members is non-empty");

        let supporting_ids: Vec<String> =
            members.iter().map(|m| m.memory_id.clone()).filter(|id| *id != canonical.memory_id).collect();

        for id in &supporting_ids {
            storage.update_memory_status(id, MemoryStatus::Supporting)?;
        }

        result.canonicalized += supporting_ids.len();
        result.details.push(CanonicalizationDetail {
            category,
            topic,
            canonical_id: canonical.memory_id.clone(),
            supporting_count: supporting_ids.len(),
        });
    }

    Ok(result)
}

fn consolidation_key(m: &Memory) -> (f64, i64, chrono::DateTime<chrono::Utc>) {
    (m.confidence_score, m.evidence_count, m.last_accessed.unwrap_or(m.last_updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ConfidenceSource;

    fn memory_with(user_id: &str, topic: &str, confidence: f64, evidence: i64) -> Memory {
        let now = chrono::Utc::now();
        Memory {
            memory_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            memory_kind: MemoryKind::Factual,
            category: "technical_context".to_string(),
            topic: topic.to_string(),
            fact: "fact".to_string(),
            importance: 1.0,
            confidence_score: confidence,
            confidence_source: ConfidenceSource::Explicit,
            frequency: 1,
            evidence_count: evidence,
            status: MemoryStatus::Active,
            embedding: None,
            metadata: serde_json::json!({}),
            expires_at: None,
            created_at: now,
            last_updated: now,
            last_accessed: None,
        }
    }

    #[test]
    fn demotes_all_but_the_strongest_per_topic() {
        let storage = Storage::open_in_memory().expect("open");
        let weak = memory_with("u1", "language", 0.6, 1);
        let strong = memory_with("u1", "language", 0.9, 5);
        storage.insert_memory(&weak).expect("insert weak");
        storage.insert_memory(&strong).expect("insert strong");

        let result = canonicalize(&storage, "u1").expect("canonicalize");
        assert_eq!(result.canonicalized, 1);
        assert_eq!(result.details[0].canonical_id, strong.memory_id);

        let demoted = storage.get_memory(&weak.memory_id).expect("get").expect("present");
        assert_eq!(demoted.status, MemoryStatus::Supporting);
        let kept = storage.get_memory(&strong.memory_id).expect("get").expect("present");
        assert_eq!(kept.status, MemoryStatus::Active);
    }

    #[test]
    fn single_memory_per_topic_is_untouched() {
        let storage = Storage::open_in_memory().expect("open");
        storage.insert_memory(&memory_with("u1", "language", 0.9, 1)).expect("insert");
        let result = canonicalize(&storage, "u1").expect("canonicalize");
        assert_eq!(result.canonicalized, 0);
    }
}
