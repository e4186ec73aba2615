//! End-to-end scenario: a session-scoped episodic memory is retrievable
//! before its TTL lapses and gone once decay runs past it (spec section 8,
//! end-to-end scenario 3).

use chrono::Utc;

use engram_core::embeddings::HashingEmbedder;
use engram_core::epistemic::{default_rules, EpistemicEngine};
use engram_core::extraction::{EpisodicScope, ExtractedEpisodic, ExtractedFacts};
use engram_core::ltm::{decay, write_facts};
use engram_core::Storage;

#[tokio::test]
async fn session_scoped_episodic_memory_is_present_then_absent_after_decay() {
    let storage = Storage::open_in_memory().expect("open in-memory storage");
    let embedder = HashingEmbedder::default();
    let epistemic = EpistemicEngine::new(default_rules());

    let facts = ExtractedFacts {
        facts: Vec::new(),
        episodic: vec![ExtractedEpisodic {
            scope: EpisodicScope::Session,
            key: "active_file".to_string(),
            value: "main.rs".to_string(),
            confidence: 0.9,
        }],
    };

    let report = write_facts(&storage, &embedder, &epistemic, "u1", &facts, "editing main.rs").await.expect("write episodic");
    assert_eq!(report.episodic_inserted, 1);

    // t0 + 30 min: still within the 1-hour session TTL, row is live.
    let at_30_min = storage.list_active_episodic("u1").expect("list at 30 min");
    assert_eq!(at_30_min.len(), 1);

    // Running decay well past the 1-hour TTL (simulating t0 + 2h) removes it.
    let deleted = decay::run(&storage, Utc::now() + chrono::Duration::hours(2)).expect("decay sweep");
    assert_eq!(deleted, 1);

    let at_2_hours = storage.list_active_episodic("u1").expect("list at 2 hours");
    assert!(at_2_hours.is_empty());
}
