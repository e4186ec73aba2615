//! Persona block types (spec section 3). Grounded in
//! `original_source/MEMORY_SYSTEM/persona/persona_schema.py`'s per-block
//! Pydantic models, expressed as Rust structs the way the teacher expresses
//! `KnowledgeNode`/`IngestInput` — flat, `serde`-driven, `camelCase` on the
//! wire.

use serde::{Deserialize, Serialize};

/// Confidence gate for block-atomic persona overwrites (spec section 4.2).
pub const CONFIDENCE_OVERRIDE_THRESHOLD: f64 = 0.80;

/// The closed set of persona block names (spec section 3).
pub const BLOCK_NAMES: &[&str] = &[
    "user_identity",
    "company_profile",
    "company_business",
    "company_products",
    "company_brand",
    "objective",
    "content_format",
    "audience",
    "tone",
    "writing_style",
    "language",
    "constraints",
];

/// One persona block as extracted: a sparse JSON object plus the
/// block-scoped confidence that gates whether it may overwrite the stored
/// block on merge. The confidence is learning-only metadata — it is
/// stripped before persistence (spec section 4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaBlock {
    pub fields: serde_json::Value,
    pub confidence: f64,
}

impl PersonaBlock {
    pub fn new(fields: serde_json::Value, confidence: f64) -> Self {
        Self { fields, confidence }
    }

    /// A block is "present" only if it carries at least one field — an
    /// all-null/empty object does not count (spec section 4.2: "Blocks with
    /// zero surviving fields are omitted").
    pub fn has_content(&self) -> bool {
        match &self.fields {
            serde_json::Value::Object(map) => map.values().any(|v| !v.is_null()),
            serde_json::Value::Null => false,
            _ => true,
        }
    }
}

/// The extracted persona: whichever blocks the structured extractor or the
/// projector produced this turn. Absent blocks are simply missing from the
/// map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedPersona {
    pub blocks: std::collections::BTreeMap<String, PersonaBlock>,
}

impl ExtractedPersona {
    pub fn block(&self, name: &str) -> Option<&PersonaBlock> {
        self.blocks.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, block: PersonaBlock) {
        self.blocks.insert(name.into(), block);
    }
}

/// The stored persona row: one JSON value per block, `None` when absent.
/// Mirrors `user_persona` (spec section 6) — twelve nullable jsonb columns
/// plus `last_updated`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredPersona {
    pub user_id: String,
    pub blocks: std::collections::BTreeMap<String, serde_json::Value>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

impl StoredPersona {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            blocks: std::collections::BTreeMap::new(),
            last_updated: None,
        }
    }

    pub fn block(&self, name: &str) -> Option<&serde_json::Value> {
        self.blocks.get(name)
    }
}
