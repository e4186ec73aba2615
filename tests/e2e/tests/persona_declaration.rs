//! End-to-end scenario: an explicit persona declaration in one turn commits
//! both fields straight to the persona blocks and never touches the
//! pattern log (spec section 8, end-to-end scenario 1).

use std::sync::Mutex;

use engram_core::cognition::{CognitionEngine, Decision, EpistemicRole, NoHistory, PatternLogger, Signal, SignalSource};
use engram_core::epistemic::{default_rules, EpistemicEngine};
use engram_core::persona::{merge_persona, project};
use engram_core::Storage;

/// Records every call, so the test can assert persona signals never reach
/// the learning path's logger.
struct SpyLogger {
    calls: Mutex<Vec<String>>,
}

impl SpyLogger {
    fn new() -> Self {
        Self { calls: Mutex::new(Vec::new()) }
    }
}

impl PatternLogger for SpyLogger {
    fn log(&self, _user_id: &str, signal: &Signal, _decision: &Decision) {
        self.calls.lock().expect("lock").push(signal.field.clone());
    }
}

#[test]
fn explicit_persona_declaration_commits_both_blocks_with_no_pattern_log_rows() {
    let storage = Storage::open_in_memory().expect("open in-memory storage");
    let engine = CognitionEngine::new();
    let epistemic = EpistemicEngine::new(default_rules());
    let logger = SpyLogger::new();

    let signals = vec![
        Signal::new("tone", "tone", serde_json::json!({"tone": "professional"}), 1.0, SignalSource::Explicit, EpistemicRole::Persona),
        Signal::new("language", "language", serde_json::json!({"language": "English"}), 1.0, SignalSource::Explicit, EpistemicRole::Persona),
    ];

    let decisions = engine.run("u1", &signals, &NoHistory, &logger);
    assert_eq!(decisions.len(), 2);
    for decision in &decisions {
        assert_eq!(decision.action, engram_core::cognition::Action::Commit);
        assert_eq!(decision.target, Some(engram_core::cognition::Target::Persona));
        assert!(decision.scope_invariant_holds());
    }

    let projected = project(&signals, &decisions);
    let stored = storage.get_persona("u1").expect("get persona");
    let merged = merge_persona(&epistemic, &stored, &projected);
    storage.upsert_persona(&merged).expect("upsert persona");

    let persisted = storage.get_persona("u1").expect("get persona");
    assert_eq!(persisted.block("tone").and_then(|v| v.get("tone")).and_then(|v| v.as_str()), Some("professional"));
    assert_eq!(persisted.block("language").and_then(|v| v.get("language")).and_then(|v| v.as_str()), Some("English"));

    assert!(logger.calls.lock().expect("lock").is_empty(), "persona-role signals must never reach the pattern log");
}
