//! Renders epistemic rules into a system-prompt block. Grounded on
//! `original_source/MEMORY_SYSTEM/epistemic/prompt_adapter.py`'s
//! `build_epistemic_prompt_block`.

use crate::epistemic::types::{EpistemicRule, RuleCategory, RuleScope};

/// Invariant and principle rules in `scope` (plus global ones) rendered as
/// "MUST"/"SHOULD" bullet lists under fixed headers. Heuristic rules are
/// never rendered — they guide the engine's own tie-breaking, not the
/// model. Returns an empty string if nothing in scope qualifies.
pub fn build_prompt_block(rules: &[EpistemicRule], scope: RuleScope) -> String {
    let relevant = rules.iter().filter(|r| r.scope == scope || r.scope == RuleScope::Global);

    let mut invariant_lines = Vec::new();
    let mut principle_lines = Vec::new();

    for rule in relevant {
        match rule.category {
            RuleCategory::Invariant => invariant_lines.push(format!("- MUST: {}", rule.statement)),
            RuleCategory::Principle => principle_lines.push(format!("- SHOULD: {}", rule.statement)),
            RuleCategory::Heuristic => {}
        }
    }

    let mut blocks = Vec::new();
    if !invariant_lines.is_empty() {
        blocks.push(format!("NON-NEGOTIABLE CONSTRAINTS:\n{}", invariant_lines.join("\n")));
    }
    if !principle_lines.is_empty() {
        blocks.push(format!("DEFAULT REASONING RULES:\n{}", principle_lines.join("\n")));
    }

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epistemic::rules::default_rules;

    #[test]
    fn memory_write_block_contains_must_lines() {
        let block = build_prompt_block(&default_rules(), RuleScope::MemoryWrite);
        assert!(block.contains("NON-NEGOTIABLE CONSTRAINTS:"));
        assert!(block.contains("MUST:"));
    }

    #[test]
    fn heuristics_never_render() {
        let block = build_prompt_block(&default_rules(), RuleScope::Global);
        assert!(!block.contains("persist it directly as a persona fact"));
    }
}
