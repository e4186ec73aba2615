//! Rule vocabulary (spec section 4.8). Grounded on
//! `original_source/MEMORY_SYSTEM/epistemic/types.py`'s `RuleCategory`,
//! `RuleScope`, and `EpistemicRule`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Invariant,
    Principle,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    MemoryWrite,
    MemoryRetrieval,
    Reasoning,
    Global,
}

/// One versioned epistemic rule. `priority` breaks ties deterministically;
/// lower sorts first. `overrideable` is advisory metadata surfaced to
/// callers — the engine itself never lets a caller skip an invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpistemicRule {
    pub rule_id: String,
    pub category: RuleCategory,
    pub scope: RuleScope,
    pub priority: i32,
    pub overrideable: bool,
    pub statement: String,
    pub rationale: Option<String>,
    pub introduced_in: String,
}
