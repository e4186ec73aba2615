//! The per-field policy table (spec section 4.1 "Policy"). ENGRAM ships a
//! compiled-in default table the way `CognitionModel` is loaded from config
//! in `original_source/MEMORY_SYSTEM/cognition/cognition_model.py`, since
//! the structured-output policy source DB is itself out of scope; callers
//! may override it via `CognitionEngine::with_policy`. Modeled as a
//! `HashMap` literal after the teacher's `FSRSParameters` const-table style
//! (`fsrs/mod.rs`).

use std::collections::HashMap;

/// Resolution mode for a field (spec section 4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Explicit,
    Implicit,
    Hybrid,
    ExplicitOrN,
}

/// Policy for a single field.
#[derive(Debug, Clone, Copy)]
pub struct FieldPolicy {
    pub mode: Mode,
    pub min_freq: u32,
    pub persona_eligible: bool,
    pub min_confidence: f64,
}

impl FieldPolicy {
    const fn new(mode: Mode, min_freq: u32, persona_eligible: bool, min_confidence: f64) -> Self {
        Self {
            mode,
            min_freq,
            persona_eligible,
            min_confidence,
        }
    }
}

/// Default `min_confidence` for fields not explicitly overridden.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.80;

/// `min_confidence` for the `constraint` category (spec section 4.1: "0.95").
pub const CONSTRAINT_MIN_CONFIDENCE: f64 = 0.95;

/// A field→policy table.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    fields: HashMap<String, FieldPolicy>,
}

impl PolicyTable {
    pub fn get(&self, field: &str) -> Option<&FieldPolicy> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, policy: FieldPolicy) {
        self.fields.insert(field.into(), policy);
    }
}

/// The compiled-in default policy table covering persona blocks (spec
/// section 3) and the learnable factual/episodic categories.
pub fn default_table() -> PolicyTable {
    let mut fields = HashMap::new();

    // Persona-owned fields: persona-eligible, reached only via the
    // epistemic_role=persona short-circuit so mode/min_freq are moot, but
    // are filled in so the table stays total.
    for field in crate::persona::schema::BLOCK_NAMES {
        fields.insert(
            (*field).to_string(),
            FieldPolicy::new(Mode::Explicit, 1, true, DEFAULT_MIN_CONFIDENCE),
        );
    }

    // Learnable fields (spec section 4.1's worked examples plus the
    // factual-fact categories of spec section 3).
    fields.insert(
        "technical_context".to_string(),
        FieldPolicy::new(Mode::Hybrid, 2, false, DEFAULT_MIN_CONFIDENCE),
    );
    fields.insert(
        "user_preference".to_string(),
        FieldPolicy::new(Mode::Hybrid, 2, false, DEFAULT_MIN_CONFIDENCE),
    );
    fields.insert(
        "problem_domain".to_string(),
        FieldPolicy::new(Mode::ExplicitOrN, 2, false, DEFAULT_MIN_CONFIDENCE),
    );
    fields.insert(
        "expertise".to_string(),
        FieldPolicy::new(Mode::Implicit, 3, false, DEFAULT_MIN_CONFIDENCE),
    );
    fields.insert(
        "constraint".to_string(),
        FieldPolicy::new(Mode::Explicit, 1, false, CONSTRAINT_MIN_CONFIDENCE),
    );
    fields.insert(
        "learned_pattern".to_string(),
        FieldPolicy::new(Mode::Implicit, 3, false, DEFAULT_MIN_CONFIDENCE),
    );

    PolicyTable { fields }
}
