//! [C13] STM Intent Gate — accepts/rejects STM write proposals (spec
//! section 4.7 step 3). Grounded in
//! `original_source/MEMORY_SYSTEM/stm/stm_intent_gatekeeper.py`'s
//! `should_commit_stm`.

use std::str::FromStr;

use crate::extraction::StmIntent;
use crate::stm::entry::{StateType, StmEntry};

/// Confidence floor below which an STM proposal is rejected regardless of
/// how complete it otherwise is (spec section 4.7 step 3).
pub const MIN_STM_CONFIDENCE: f64 = 0.6;

/// Why a proposal was rejected, surfaced for logging/debugging only — the
/// gate itself never raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    NotProposed,
    MissingStateType,
    UnknownStateType,
    MissingStatement,
    BelowConfidence,
}

/// Evaluate a proposal: accept iff `should_write = true AND state_type !=
/// null AND statement != null AND confidence >= 0.6` (spec section 4.7).
/// On acceptance, builds the [`StmEntry`] ready for an atomic commit;
/// `supersedes` is left unset per spec section 9's conservative-off
/// decision (see SPEC_FULL.md's Open Question resolution) — callers may
/// populate it themselves if a product policy later opts in.
pub fn evaluate(user_id: &str, intent: &StmIntent) -> Result<StmEntry, GateRejection> {
    if !intent.should_write {
        return Err(GateRejection::NotProposed);
    }
    let state_type_raw = intent.state_type.as_deref().ok_or(GateRejection::MissingStateType)?;
    let state_type = StateType::from_str(state_type_raw).map_err(|_| GateRejection::UnknownStateType)?;
    let statement = intent.statement.as_deref().ok_or(GateRejection::MissingStatement)?;
    if intent.confidence < MIN_STM_CONFIDENCE {
        return Err(GateRejection::BelowConfidence);
    }

    let mut entry = StmEntry::new(user_id, state_type, statement, intent.confidence);
    entry.rationale = intent.rationale.clone();
    entry.applies_to = intent.applies_to.clone();
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted_intent() -> StmIntent {
        StmIntent {
            should_write: true,
            state_type: Some("decision".to_string()),
            statement: Some("Target enterprise customers".to_string()),
            rationale: None,
            applies_to: None,
            confidence: 0.92,
        }
    }

    #[test]
    fn accepts_a_complete_high_confidence_proposal() {
        let entry = evaluate("u1", &accepted_intent()).expect("should accept");
        assert_eq!(entry.state_type, StateType::Decision);
        assert_eq!(entry.statement, "Target enterprise customers");
        assert!(entry.is_active);
    }

    #[test]
    fn rejects_below_confidence() {
        let mut intent = accepted_intent();
        intent.confidence = 0.4;
        assert_eq!(evaluate("u1", &intent), Err(GateRejection::BelowConfidence));
    }

    #[test]
    fn rejects_when_not_proposed() {
        let mut intent = accepted_intent();
        intent.should_write = false;
        assert_eq!(evaluate("u1", &intent), Err(GateRejection::NotProposed));
    }

    #[test]
    fn rejects_missing_statement() {
        let mut intent = accepted_intent();
        intent.statement = None;
        assert_eq!(evaluate("u1", &intent), Err(GateRejection::MissingStatement));
    }

    #[test]
    fn rejects_unknown_state_type() {
        let mut intent = accepted_intent();
        intent.state_type = Some("mystery".to_string());
        assert_eq!(evaluate("u1", &intent), Err(GateRejection::UnknownStateType));
    }
}
