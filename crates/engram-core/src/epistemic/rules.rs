//! The default rule set, standing in for
//! `original_source/MEMORY_SYSTEM/epistemic/loader.py`'s YAML-backed
//! `load_epistemic_rules` — the rules themselves are fixed in this crate
//! rather than loaded from a file, but carry the same fields and the same
//! deterministic priority ordering.

use crate::epistemic::types::{EpistemicRule, RuleCategory, RuleScope};

/// Rules sorted by ascending `priority`, matching the loader's contract.
pub fn default_rules() -> Vec<EpistemicRule> {
    let mut rules = vec![
        EpistemicRule {
            rule_id: "EPI-001".to_string(),
            category: RuleCategory::Invariant,
            scope: RuleScope::MemoryWrite,
            priority: 1,
            overrideable: false,
            statement: "Every episodic memory row must carry a non-null expiry no earlier than its creation time.".to_string(),
            rationale: Some("Episodic facts are provisional by construction; an episodic row without a TTL is a factual row in disguise.".to_string()),
            introduced_in: "v1".to_string(),
        },
        EpistemicRule {
            rule_id: "EPI-002".to_string(),
            category: RuleCategory::Invariant,
            scope: RuleScope::MemoryWrite,
            priority: 2,
            overrideable: false,
            statement: "An active factual memory must have confidence >= 0, importance <= 10, and frequency >= 1.".to_string(),
            rationale: None,
            introduced_in: "v1".to_string(),
        },
        EpistemicRule {
            rule_id: "EPI-003".to_string(),
            category: RuleCategory::Invariant,
            scope: RuleScope::MemoryWrite,
            priority: 3,
            overrideable: false,
            statement: "A stored persona block may only be overwritten by a block asserted with confidence >= 0.80.".to_string(),
            rationale: Some("Persona is load-bearing for every future turn; a low-confidence guess must not displace an established block.".to_string()),
            introduced_in: "v1".to_string(),
        },
        EpistemicRule {
            rule_id: "EPI-004".to_string(),
            category: RuleCategory::Invariant,
            scope: RuleScope::Reasoning,
            priority: 4,
            overrideable: false,
            statement: "Every signal the cognition engine consumes must produce exactly one decision, and every COMMIT or PARTIAL_COMMIT decision targeting persona must carry a non-empty scope.".to_string(),
            rationale: None,
            introduced_in: "v1".to_string(),
        },
        EpistemicRule {
            rule_id: "EPI-005".to_string(),
            category: RuleCategory::Invariant,
            scope: RuleScope::MemoryRetrieval,
            priority: 5,
            overrideable: false,
            statement: "Episodic retrieval results must never appear in the factual result set, and vice versa.".to_string(),
            rationale: None,
            introduced_in: "v1".to_string(),
        },
        EpistemicRule {
            rule_id: "EPI-010".to_string(),
            category: RuleCategory::Principle,
            scope: RuleScope::Reasoning,
            priority: 10,
            overrideable: true,
            statement: "Prefer reinforcing an existing memory over creating a near-duplicate when one already covers the same fact.".to_string(),
            rationale: None,
            introduced_in: "v1".to_string(),
        },
        EpistemicRule {
            rule_id: "EPI-011".to_string(),
            category: RuleCategory::Principle,
            scope: RuleScope::MemoryRetrieval,
            priority: 11,
            overrideable: true,
            statement: "When retrieval intent is ambiguous, prefer a narrower result set over a broad one.".to_string(),
            rationale: None,
            introduced_in: "v1".to_string(),
        },
        EpistemicRule {
            rule_id: "EPI-020".to_string(),
            category: RuleCategory::Heuristic,
            scope: RuleScope::Global,
            priority: 20,
            overrideable: true,
            statement: "Treat short-term state as provisional signal that informs persona and memory decisions; never persist it directly as a persona fact.".to_string(),
            rationale: None,
            introduced_in: "v1".to_string(),
        },
    ];
    rules.sort_by_key(|r| r.priority);
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_sorted_by_priority() {
        let rules = default_rules();
        let priorities: Vec<i32> = rules.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }
}
