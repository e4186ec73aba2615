//! Signal and decision types (spec section 4.1), grounded in
//! `original_source/MEMORY_SYSTEM/cognition/cognition_updater.py`'s signal
//! dict shape.

use serde::{Deserialize, Serialize};

/// Where a signal originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Explicit,
    Implicit,
    Derived,
}

impl SignalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::Explicit => "explicit",
            SignalSource::Implicit => "implicit",
            SignalSource::Derived => "derived",
        }
    }
}

/// Whether a signal is persona-owned or feeds the learning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpistemicRole {
    Persona,
    Learnable,
}

/// A candidate update fed to the cognition engine (spec section 4.1
/// "Inputs").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub category: String,
    pub field: String,
    pub value: serde_json::Value,
    pub base_confidence: f64,
    pub source: SignalSource,
    pub epistemic_role: EpistemicRole,
    /// Populated by [`crate::cognition::frequency`] before evaluation;
    /// defaults to 1 (this occurrence) for a signal nobody has enriched
    /// yet.
    pub frequency: u32,
}

impl Signal {
    pub fn new(
        category: impl Into<String>,
        field: impl Into<String>,
        value: serde_json::Value,
        base_confidence: f64,
        source: SignalSource,
        epistemic_role: EpistemicRole,
    ) -> Self {
        Self {
            category: category.into(),
            field: field.into(),
            value,
            base_confidence,
            source,
            epistemic_role,
            frequency: 1,
        }
    }
}

/// Cognition's verdict on a signal (spec section 4.1 "Outputs").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Commit,
    PartialCommit,
    ProvisionalCommit,
    Defer,
    Reject,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Commit => "COMMIT",
            Action::PartialCommit => "PARTIAL_COMMIT",
            Action::ProvisionalCommit => "PROVISIONAL_COMMIT",
            Action::Defer => "DEFER",
            Action::Reject => "REJECT",
        }
    }
}

/// Where a committed decision should be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Persona,
    Runtime,
    PatternLog,
}

/// One decision per signal (spec section 4.1 "Outputs"). `scope` lists the
/// field(s) this decision covers; every `COMMIT`/`PARTIAL_COMMIT` with
/// `target=persona` must carry a non-empty scope (spec section 8,
/// invariant 5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub target: Option<Target>,
    pub scope: Vec<String>,
    pub confidence: f64,
    pub reason: String,
}

impl Decision {
    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            action: Action::Reject,
            target: None,
            scope: Vec::new(),
            confidence: 0.0,
            reason: reason.into(),
        }
    }

    /// Invariant from spec section 8, #5: every COMMIT/PARTIAL_COMMIT
    /// targeting persona has a non-empty scope.
    pub fn scope_invariant_holds(&self) -> bool {
        match (self.action, self.target) {
            (Action::Commit | Action::PartialCommit, Some(Target::Persona)) => {
                !self.scope.is_empty()
            }
            _ => true,
        }
    }
}
