//! [C9] LTM Writer — dedup/reinforce/insert for factual facts, TTL'd
//! inserts for episodic facts, per-item error isolation. Grounded in
//! `original_source/MEMORY_SYSTEM/ltm/{store_ltm,store_episodic_ltm}.py`.

use chrono::Utc;

use crate::embeddings::EmbeddingProvider;
use crate::epistemic::{EnforcementContext, EpistemicEngine, RuleScope};
use crate::extraction::{ExtractedEpisodic, ExtractedFact, ExtractedFacts};
use crate::memory::{truncate_chars, ConfidenceSource, Memory, MemoryEvent, MemoryEventType, MemoryKind, MemoryStatus};
use crate::storage::{Storage, StorageError};

/// Cosine-distance floor under which a new fact is treated as a duplicate
/// of the nearest active factual memory (spec section 4.3).
pub const SEMANTIC_DUP_DISTANCE: f32 = 0.12;
pub const IMPORTANCE_INCREMENT: f64 = 0.5;
pub const MAX_IMPORTANCE: f64 = crate::memory::MAX_IMPORTANCE;

/// Raw context is capped at this many Unicode scalars before being stored
/// on the `extracted` event (spec section 4.3).
pub const RAW_CONTEXT_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub reinforced: usize,
    pub inserted: usize,
    pub episodic_inserted: usize,
    /// Facts that failed in isolation (spec section 4.3 "Failure
    /// semantics") — one bad fact must not abort the batch.
    pub skipped: usize,
}

/// Write a batch of extracted facts for `user_id`. Embeds each fact text,
/// dedups against the nearest active factual memory, and appends an
/// `extracted` event either way. Episodic facts never dedup against
/// factual rows and always insert.
pub async fn write_facts(
    storage: &Storage,
    embedder: &dyn EmbeddingProvider,
    epistemic: &EpistemicEngine,
    user_id: &str,
    facts: &ExtractedFacts,
    raw_context: &str,
) -> Result<WriteReport, StorageError> {
    let mut report = WriteReport::default();
    let truncated_context = truncate_chars(raw_context, RAW_CONTEXT_MAX_CHARS);

    for fact in &facts.facts {
        match write_one_factual(storage, embedder, user_id, fact, &truncated_context).await {
            Ok(true) => report.reinforced += 1,
            Ok(false) => report.inserted += 1,
            Err(err) => {
                tracing::warn!(error = %err, fact = %fact.fact, "skipping fact after write failure");
                report.skipped += 1;
            }
        }
    }

    for episodic in &facts.episodic {
        match write_one_episodic(storage, embedder, epistemic, user_id, episodic, &truncated_context).await {
            Ok(()) => report.episodic_inserted += 1,
            Err(err) => {
                tracing::warn!(error = %err, key = %episodic.key, "skipping episodic fact after write failure");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}

/// Returns `Ok(true)` if the fact reinforced an existing row, `Ok(false)`
/// if it was inserted as new.
async fn write_one_factual(
    storage: &Storage,
    embedder: &dyn EmbeddingProvider,
    user_id: &str,
    fact: &ExtractedFact,
    raw_context: &str,
) -> Result<bool, StorageError> {
    let embedding = embedder.embed(&fact.fact).map_err(|e| StorageError::Init(format!("embedding failed: {e}")))?;

    let nearest = storage.find_nearest_active_factual(user_id, &embedding)?;

    let (memory_id, reinforced) = match nearest {
        Some((existing, distance)) if distance < SEMANTIC_DUP_DISTANCE => {
            storage.reinforce_memory(&existing.memory_id, IMPORTANCE_INCREMENT, MAX_IMPORTANCE)?;
            (existing.memory_id, true)
        }
        _ => {
            let now = Utc::now();
            let memory = Memory {
                memory_id: uuid::Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                memory_kind: MemoryKind::Factual,
                category: fact.category.clone(),
                topic: fact.topic.clone(),
                fact: fact.fact.clone(),
                importance: fact.importance,
                confidence_score: fact.confidence,
                confidence_source: ConfidenceSource::Implicit,
                frequency: 1,
                evidence_count: 1,
                status: MemoryStatus::Active,
                embedding: Some(embedding),
                metadata: serde_json::json!({}),
                expires_at: None,
                created_at: now,
                last_updated: now,
                last_accessed: None,
            };
            storage.insert_memory(&memory)?;
            (memory.memory_id, false)
        }
    };

    storage.append_event(&MemoryEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        memory_id,
        event_type: MemoryEventType::Extracted,
        source: "llm".to_string(),
        signal_strength: fact.confidence,
        raw_context: raw_context.to_string(),
        metadata: serde_json::json!({}),
        created_at: Utc::now(),
    })?;

    Ok(reinforced)
}

async fn write_one_episodic(
    storage: &Storage,
    embedder: &dyn EmbeddingProvider,
    epistemic: &EpistemicEngine,
    user_id: &str,
    episodic: &ExtractedEpisodic,
    raw_context: &str,
) -> Result<(), StorageError> {
    let fact_text = format!("{}: {}", episodic.key, episodic.value);
    let embedding = embedder.embed(&fact_text).map_err(|e| StorageError::Init(format!("embedding failed: {e}")))?;

    let now = Utc::now();
    let expires_at = now + episodic.scope.ttl();

    epistemic.assert_allowed(
        RuleScope::MemoryWrite,
        &EnforcementContext { episodic_expiry: Some((now, expires_at)), ..Default::default() },
    )?;

    let memory = Memory {
        memory_id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        memory_kind: MemoryKind::Episodic,
        category: context_type_label(episodic),
        topic: episodic.key.clone(),
        fact: fact_text,
        importance: 1.0,
        confidence_score: episodic.confidence,
        confidence_source: ConfidenceSource::Implicit,
        frequency: 1,
        evidence_count: 1,
        status: MemoryStatus::Active,
        embedding: Some(embedding),
        metadata: serde_json::json!({"scope": scope_label(episodic), "source": "episodic_extraction"}),
        expires_at: Some(expires_at),
        created_at: now,
        last_updated: now,
        last_accessed: None,
    };
    let memory_id = memory.memory_id.clone();
    storage.insert_memory(&memory)?;

    storage.append_event(&MemoryEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        memory_id,
        event_type: MemoryEventType::Extracted,
        source: "llm".to_string(),
        signal_strength: episodic.confidence,
        raw_context: raw_context.to_string(),
        metadata: serde_json::json!({}),
        created_at: Utc::now(),
    })?;

    Ok(())
}

fn scope_label(episodic: &ExtractedEpisodic) -> &'static str {
    match episodic.scope {
        crate::extraction::EpisodicScope::Session => "session",
        crate::extraction::EpisodicScope::MultiTurn => "multi_turn",
        crate::extraction::EpisodicScope::Task => "task",
    }
}

/// Episodic category mirrors the extractor's `context_type`; since
/// `ExtractedEpisodic` doesn't carry a separate context type field here, the
/// key doubles as the category the way `topic=key` already does (spec
/// section 4.3: "category=context_type, topic=key").
fn context_type_label(episodic: &ExtractedEpisodic) -> String {
    episodic.key.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashingEmbedder;
    use crate::epistemic::default_rules;
    use crate::extraction::EpisodicScope;

    #[tokio::test]
    async fn first_fact_inserts_second_identical_fact_reinforces() {
        let storage = Storage::open_in_memory().expect("open");
        let embedder = HashingEmbedder::default();
        let epistemic = EpistemicEngine::new(default_rules());
        let fact = ExtractedFact {
            category: "technical_context".to_string(),
            topic: "language".to_string(),
            fact: "User prefers Rust".to_string(),
            importance: 1.0,
            confidence: 0.8,
        };
        let facts = ExtractedFacts { facts: vec![fact.clone()], episodic: vec![] };

        let first = write_facts(&storage, &embedder, &epistemic, "u1", &facts, "ctx").await.expect("write 1");
        assert_eq!(first.inserted, 1);

        let second = write_facts(&storage, &embedder, &epistemic, "u1", &facts, "ctx").await.expect("write 2");
        assert_eq!(second.reinforced, 1);

        let rows = storage.list_active_factual("u1").expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].frequency, 2);
    }

    #[tokio::test]
    async fn episodic_fact_sets_expiry_from_scope_ttl() {
        let storage = Storage::open_in_memory().expect("open");
        let embedder = HashingEmbedder::default();
        let epistemic = EpistemicEngine::new(default_rules());
        let episodic = ExtractedEpisodic {
            scope: EpisodicScope::Session,
            key: "active_file".to_string(),
            value: "main.rs".to_string(),
            confidence: 0.9,
        };
        let facts = ExtractedFacts { facts: vec![], episodic: vec![episodic] };

        let report = write_facts(&storage, &embedder, &epistemic, "u1", &facts, "ctx").await.expect("write");
        assert_eq!(report.episodic_inserted, 1);

        let rows = storage.list_active_episodic("u1").expect("list");
        assert_eq!(rows.len(), 1);
        assert!(rows[0].expires_at.is_some());
    }
}
