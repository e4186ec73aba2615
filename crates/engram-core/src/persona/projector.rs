//! Persona projection (spec section 4.2): "Given the extracted persona and
//! the decision list, the projector emits a minimal persona containing
//! exactly those fields whose decisions are COMMIT|PARTIAL_COMMIT with
//! target=persona." Grounded in
//! `original_source/MEMORY_SYSTEM/persona/persona_merger.py`'s
//! `project_persona_updates`, which walks the same zipped
//! (signal, decision) pairs.

use crate::cognition::{Action, Decision, Signal, Target};
use crate::persona::schema::PersonaBlock;

/// The minimal persona assembled this turn from committed persona signals.
/// Structurally identical to [`crate::persona::schema::ExtractedPersona`]
/// but semantically distinct: this is cognition's output, not the
/// extractor's raw guess.
#[derive(Debug, Clone, Default)]
pub struct ProjectedPersona {
    pub blocks: std::collections::BTreeMap<String, PersonaBlock>,
}

impl ProjectedPersona {
    pub fn block(&self, name: &str) -> Option<&PersonaBlock> {
        self.blocks.get(name)
    }
}

/// Project `(signals, decisions)` pairs into a [`ProjectedPersona`].
///
/// The field→block map is the identity over
/// [`crate::persona::schema::BLOCK_NAMES`]: a persona signal's `field` IS
/// the block name it targets (spec section 3 lists blocks, not sub-fields
/// within them). Blocks with zero surviving fields are simply absent from
/// the map (spec section 4.2). Learning-only confidence is retained on the
/// `PersonaBlock` only transiently, for [`crate::persona::merger::choose_block`]'s
/// gate — it never reaches [`crate::persona::schema::StoredPersona`].
///
/// Panics if `signals.len() != decisions.len()`; callers always produce
/// these as a matched pair via [`crate::cognition::CognitionEngine::run`].
pub fn project(signals: &[Signal], decisions: &[Decision]) -> ProjectedPersona {
    assert_eq!(
        signals.len(),
        decisions.len(),
        "signals and decisions must be produced as a matched pair"
    );

    let mut projected = ProjectedPersona::default();

    for (signal, decision) in signals.iter().zip(decisions.iter()) {
        if decision.target != Some(Target::Persona) {
            continue;
        }
        if !matches!(decision.action, Action::Commit | Action::PartialCommit) {
            continue;
        }
        for field in &decision.scope {
            if !crate::persona::schema::BLOCK_NAMES.contains(&field.as_str()) {
                continue;
            }
            projected.blocks.insert(
                field.clone(),
                PersonaBlock::new(signal.value.clone(), decision.confidence),
            );
        }
    }

    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognition::{EpistemicRole, SignalSource};

    #[test]
    fn commit_with_persona_target_is_projected() {
        let signal = Signal::new(
            "tone",
            "tone",
            serde_json::json!("professional"),
            1.0,
            SignalSource::Explicit,
            EpistemicRole::Persona,
        );
        let decision = Decision {
            action: Action::Commit,
            target: Some(Target::Persona),
            scope: vec!["tone".to_string()],
            confidence: 1.0,
            reason: "explicit persona declaration".to_string(),
        };
        let projected = project(&[signal], &[decision]);
        assert!(projected.block("tone").is_some());
    }

    #[test]
    fn deferred_decision_is_not_projected() {
        let signal = Signal::new(
            "mystery",
            "mystery",
            serde_json::json!("value"),
            0.9,
            SignalSource::Explicit,
            EpistemicRole::Learnable,
        );
        let decision = Decision::reject("unrelated");
        let projected = project(&[signal], &[decision]);
        assert!(projected.blocks.is_empty());
    }

    #[test]
    fn learnable_runtime_commit_is_not_projected() {
        let signal = Signal::new(
            "constraint",
            "constraint",
            serde_json::json!("no emojis"),
            0.99,
            SignalSource::Explicit,
            EpistemicRole::Learnable,
        );
        let decision = Decision {
            action: Action::Commit,
            target: Some(Target::Runtime),
            scope: vec!["constraint".to_string()],
            confidence: 0.99,
            reason: "explicit mode resolution".to_string(),
        };
        let projected = project(&[signal], &[decision]);
        assert!(projected.blocks.is_empty());
    }
}
