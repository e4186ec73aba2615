//! End-to-end scenario: the same factual statement arrives in two separate
//! sessions; the second turn reinforces rather than duplicates (spec
//! section 8, end-to-end scenario 2).

use engram_core::embeddings::HashingEmbedder;
use engram_core::epistemic::{default_rules, EpistemicEngine};
use engram_core::extraction::{ExtractedFact, ExtractedFacts};
use engram_core::ltm::write_facts;
use engram_core::memory::{MemoryEventType, MemoryStatus};
use engram_core::Storage;

fn fact() -> ExtractedFacts {
    ExtractedFacts {
        facts: vec![ExtractedFact {
            category: "technical_context".to_string(),
            topic: "language".to_string(),
            fact: "User prefers Rust over Python for backend services".to_string(),
            importance: 3.0,
            confidence: 0.9,
        }],
        episodic: Vec::new(),
    }
}

#[tokio::test]
async fn second_turn_reinforces_the_first_instead_of_duplicating() {
    let storage = Storage::open_in_memory().expect("open in-memory storage");
    let embedder = HashingEmbedder::default();
    let epistemic = EpistemicEngine::new(default_rules());

    let first = write_facts(&storage, &embedder, &epistemic, "u1", &fact(), "session-1 turn").await.expect("write turn 1");
    assert_eq!(first.inserted, 1);
    assert_eq!(first.reinforced, 0);

    let second = write_facts(&storage, &embedder, &epistemic, "u1", &fact(), "session-2 turn").await.expect("write turn 2");
    assert_eq!(second.inserted, 0);
    assert_eq!(second.reinforced, 1);

    let active = storage.list_active_factual("u1").expect("list active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].status, MemoryStatus::Active);
    assert_eq!(active[0].frequency, 2);

    let events = storage.events_for_memory(&active[0].memory_id).expect("events");
    let extracted: Vec<_> = events.iter().filter(|e| e.event_type == MemoryEventType::Extracted).collect();
    assert_eq!(extracted.len(), 2);
    assert!(extracted.iter().all(|e| e.source == "llm"));
}
