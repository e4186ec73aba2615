//! End-to-end scenario: the STM intent gate commits a complete,
//! high-confidence proposal and rejects the identical proposal once its
//! confidence drops below the floor (spec section 8, end-to-end scenario 6).

use engram_core::extraction::StmIntent;
use engram_core::stm::{evaluate, StateType};
use engram_core::Storage;

fn decision_intent(confidence: f64) -> StmIntent {
    StmIntent {
        should_write: true,
        state_type: Some("decision".to_string()),
        statement: Some("Target enterprise customers".to_string()),
        rationale: None,
        applies_to: None,
        confidence,
    }
}

#[test]
fn high_confidence_proposal_commits_low_confidence_does_not() {
    let storage = Storage::open_in_memory().expect("open in-memory storage");

    let entry = evaluate("u1", &decision_intent(0.92)).expect("gate should accept");
    assert_eq!(entry.state_type, StateType::Decision);
    storage.insert_stm_entry(&entry).expect("insert stm entry");

    let active = storage.list_active_stm("u1").expect("list active stm");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].statement, "Target enterprise customers");

    let rejected = evaluate("u1", &decision_intent(0.4));
    assert!(rejected.is_err());

    // No new row was written for the rejected proposal.
    let still_active = storage.list_active_stm("u1").expect("list active stm");
    assert_eq!(still_active.len(), 1);
}
