//! Block-atomic confidence-gated merge (spec section 4.2), grounded in
//! `original_source/MEMORY_SYSTEM/persona/persona_merger.py`'s `choose_block`.

use crate::epistemic::{EnforcementContext, EpistemicEngine, RuleScope};
use crate::persona::schema::StoredPersona;
use crate::persona::ProjectedPersona;

/// Decide whether to overwrite a stored block with an incoming one. The
/// overwrite gate itself (EPI-003: a stored block may only be overwritten by
/// one asserted with confidence >= 0.80) lives in `epistemic` and is
/// enforced here rather than duplicated as a bare threshold comparison.
///
/// - `None` incoming ⇒ keep whatever's stored (never overwrite with
///   nothing).
/// - Stored absent ⇒ take the incoming block unconditionally (nothing is
///   being overwritten, so EPI-003 doesn't apply).
/// - Otherwise defer to `epistemic`; a rejected overwrite keeps the stored
///   value rather than aborting the whole merge.
pub fn choose_block(
    epistemic: &EpistemicEngine,
    stored: Option<&serde_json::Value>,
    incoming: Option<&serde_json::Value>,
    incoming_confidence: f64,
) -> Option<serde_json::Value> {
    let incoming = match incoming {
        Some(v) => v,
        None => return stored.cloned(),
    };

    match stored {
        None => Some(incoming.clone()),
        Some(stored_value) => {
            let context = EnforcementContext { persona_overwrite_confidence: Some(incoming_confidence), ..Default::default() };
            match epistemic.assert_allowed(RuleScope::MemoryWrite, &context) {
                Ok(()) => Some(incoming.clone()),
                Err(violation) => {
                    tracing::debug!(rule_id = %violation.rule_id, "persona block overwrite rejected");
                    Some(stored_value.clone())
                }
            }
        }
    }
}

/// Merge a projected persona onto a stored one, block by block, and return
/// the new stored persona ready for a single atomic upsert.
pub fn merge_persona(epistemic: &EpistemicEngine, stored: &StoredPersona, projected: &ProjectedPersona) -> StoredPersona {
    let mut merged = stored.clone();

    for name in crate::persona::schema::BLOCK_NAMES {
        let incoming = projected.blocks.get(*name);
        let stored_block = stored.block(name);

        let incoming_confidence = incoming.map(|b| b.confidence).unwrap_or(0.0);
        let incoming_fields = incoming.map(|b| &b.fields);

        let result = choose_block(epistemic, stored_block, incoming_fields, incoming_confidence);

        match result {
            Some(value) => {
                merged.blocks.insert((*name).to_string(), value);
            }
            None => {
                merged.blocks.remove(*name);
            }
        }
    }

    merged.last_updated = Some(chrono::Utc::now());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epistemic::default_rules;
    use crate::persona::schema::PersonaBlock;

    fn persona_with(name: &str, value: serde_json::Value) -> StoredPersona {
        let mut p = StoredPersona::new("u1");
        p.blocks.insert(name.to_string(), value);
        p
    }

    #[test]
    fn absent_incoming_keeps_stored() {
        let epistemic = EpistemicEngine::new(default_rules());
        let stored = Some(serde_json::json!({"tone": "formal"}));
        assert_eq!(choose_block(&epistemic, stored.as_ref(), None, 0.9), stored);
    }

    #[test]
    fn absent_stored_takes_incoming_regardless_of_confidence() {
        let epistemic = EpistemicEngine::new(default_rules());
        let incoming = serde_json::json!({"tone": "casual"});
        assert_eq!(choose_block(&epistemic, None, Some(&incoming), 0.1), Some(incoming));
    }

    #[test]
    fn low_confidence_does_not_overwrite() {
        let epistemic = EpistemicEngine::new(default_rules());
        let stored = serde_json::json!({"tone": "formal"});
        let incoming = serde_json::json!({"tone": "casual"});
        let result = choose_block(&epistemic, Some(&stored), Some(&incoming), 0.5);
        assert_eq!(result, Some(stored));
    }

    #[test]
    fn high_confidence_overwrites() {
        let epistemic = EpistemicEngine::new(default_rules());
        let stored = serde_json::json!({"tone": "formal"});
        let incoming = serde_json::json!({"tone": "casual"});
        let result = choose_block(&epistemic, Some(&stored), Some(&incoming), 0.95);
        assert_eq!(result, Some(incoming));
    }

    #[test]
    fn merge_persona_only_touches_projected_blocks() {
        let epistemic = EpistemicEngine::new(default_rules());
        let stored = persona_with("tone", serde_json::json!({"tone": "formal"}));
        let mut projected = ProjectedPersona::default();
        projected.blocks.insert(
            "language".to_string(),
            PersonaBlock::new(serde_json::json!({"language": "English"}), 1.0),
        );

        let merged = merge_persona(&epistemic, &stored, &projected);
        assert_eq!(
            merged.block("tone"),
            Some(&serde_json::json!({"tone": "formal"}))
        );
        assert_eq!(
            merged.block("language"),
            Some(&serde_json::json!({"language": "English"}))
        );
    }
}
