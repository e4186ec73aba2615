//! [C-epistemic] The rule engine itself — scope filtering and pre-action
//! invariant enforcement. Grounded on
//! `original_source/MEMORY_SYSTEM/epistemic/epistemic_engine.py`'s
//! `EpistemicEngine`; enforcement stays explicit per rule id rather than
//! generic, matching the original's comment that "enforcement logic is
//! explicit, not LLM-based".

use chrono::{DateTime, Utc};

use crate::epistemic::types::{EpistemicRule, RuleCategory, RuleScope};

/// Carries whatever a call site knows about the action it's about to take.
/// Extend with more fields as more invariants gain programmatic checks;
/// an absent field simply means that rule can't fire for this call.
#[derive(Debug, Clone, Default)]
pub struct EnforcementContext {
    /// Confidence of the incoming persona block attempting to overwrite a
    /// stored one, if this action is a persona overwrite attempt.
    pub persona_overwrite_confidence: Option<f64>,
    /// `(created_at, expires_at)` of an episodic row about to be inserted,
    /// if this action is an episodic memory write.
    pub episodic_expiry: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("epistemic violation [{rule_id}]: {statement}")]
pub struct EpistemicViolation {
    pub rule_id: String,
    pub statement: String,
}

pub struct EpistemicEngine {
    rules: Vec<EpistemicRule>,
}

impl EpistemicEngine {
    /// `rules` is sorted by priority on construction so every downstream
    /// consumer (prompt rendering, enforcement) sees deterministic order.
    pub fn new(mut rules: Vec<EpistemicRule>) -> Self {
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    pub fn rules(&self) -> &[EpistemicRule] {
        &self.rules
    }

    pub fn rules_for_scope(&self, scope: RuleScope) -> Vec<&EpistemicRule> {
        self.rules.iter().filter(|r| r.scope == scope || r.scope == RuleScope::Global).collect()
    }

    /// Called before a critical write or decision. Checks every invariant
    /// rule in scope and returns the first violation, if any.
    pub fn assert_allowed(&self, scope: RuleScope, context: &EnforcementContext) -> Result<(), EpistemicViolation> {
        for rule in self.rules_for_scope(scope) {
            if rule.category == RuleCategory::Invariant {
                enforce(rule, context)?;
            }
        }
        Ok(())
    }
}

fn enforce(rule: &EpistemicRule, context: &EnforcementContext) -> Result<(), EpistemicViolation> {
    match rule.rule_id.as_str() {
        "EPI-001" => {
            if let Some((created_at, expires_at)) = context.episodic_expiry {
                if expires_at < created_at {
                    return Err(EpistemicViolation { rule_id: rule.rule_id.clone(), statement: rule.statement.clone() });
                }
            }
            Ok(())
        }
        "EPI-003" => {
            if let Some(confidence) = context.persona_overwrite_confidence {
                if confidence < crate::persona::CONFIDENCE_OVERRIDE_THRESHOLD {
                    return Err(EpistemicViolation { rule_id: rule.rule_id.clone(), statement: rule.statement.clone() });
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
