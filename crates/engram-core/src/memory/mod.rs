//! The memory entity and its append-only event log (spec section 3).
//!
//! Field layout follows `KnowledgeNode` in the teacher crate — a flat struct
//! with `serde(rename_all = "camelCase")` — but the field set is reworked
//! around the factual/episodic model instead of the teacher's FSRS state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on `importance`.
pub const MAX_IMPORTANCE: f64 = 10.0;

/// Kind of memory row: durable facts vs. short-lived referential context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    Factual,
    Episodic,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Factual => "factual",
            MemoryKind::Episodic => "episodic",
        }
    }
}

impl std::str::FromStr for MemoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "factual" => Ok(MemoryKind::Factual),
            "episodic" => Ok(MemoryKind::Episodic),
            other => Err(format!("unknown memory_kind: {other}")),
        }
    }
}

/// Lifecycle status of a memory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    Active,
    Historical,
    Conflicting,
    Merged,
    Supporting,
}

impl MemoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryStatus::Active => "active",
            MemoryStatus::Historical => "historical",
            MemoryStatus::Conflicting => "conflicting",
            MemoryStatus::Merged => "merged",
            MemoryStatus::Supporting => "supporting",
        }
    }
}

impl std::str::FromStr for MemoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemoryStatus::Active),
            "historical" => Ok(MemoryStatus::Historical),
            "conflicting" => Ok(MemoryStatus::Conflicting),
            "merged" => Ok(MemoryStatus::Merged),
            "supporting" => Ok(MemoryStatus::Supporting),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// Provenance of a memory's confidence score. Fixed to the full union named
/// in spec section 9's Open Question rather than any single source file's
/// narrower subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    Explicit,
    Implicit,
    Derived,
    Inferred,
    Validated,
}

impl ConfidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceSource::Explicit => "explicit",
            ConfidenceSource::Implicit => "implicit",
            ConfidenceSource::Derived => "derived",
            ConfidenceSource::Inferred => "inferred",
            ConfidenceSource::Validated => "validated",
        }
    }
}

impl std::str::FromStr for ConfidenceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explicit" => Ok(ConfidenceSource::Explicit),
            "implicit" => Ok(ConfidenceSource::Implicit),
            "derived" => Ok(ConfidenceSource::Derived),
            "inferred" => Ok(ConfidenceSource::Inferred),
            "validated" => Ok(ConfidenceSource::Validated),
            other => Err(format!("unknown confidence_source: {other}")),
        }
    }
}

/// A single memory row (spec section 3's "Memory entity").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub memory_id: String,
    pub user_id: String,
    pub memory_kind: MemoryKind,
    pub category: String,
    pub topic: String,
    pub fact: String,
    pub importance: f64,
    pub confidence_score: f64,
    pub confidence_source: ConfidenceSource,
    pub frequency: i64,
    pub evidence_count: i64,
    pub status: MemoryStatus,
    /// 1024-dim unit-normalized embedding. Absent only for rows written
    /// before an embedding provider was configured; episodic rows always
    /// carry one too once C9 embeds the fact text.
    pub embedding: Option<Vec<f32>>,
    pub metadata: serde_json::Value,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl Memory {
    /// Invariant check from spec section 8, invariant 1: episodic rows must
    /// carry `expires_at` and it must not precede `created_at`.
    pub fn episodic_invariant_holds(&self) -> bool {
        if self.memory_kind != MemoryKind::Episodic {
            return true;
        }
        matches!(self.expires_at, Some(exp) if self.created_at <= exp)
    }

    /// Invariant check from spec section 8, invariant 2.
    pub fn active_factual_invariant_holds(&self) -> bool {
        if self.status != MemoryStatus::Active || self.memory_kind != MemoryKind::Factual {
            return true;
        }
        self.confidence_score >= 0.0 && self.importance <= MAX_IMPORTANCE && self.frequency >= 1
    }
}

/// Kind of append-only event recorded against a memory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryEventType {
    Extracted,
    Reinforced,
    Retrieved,
    Merged,
    Conflicted,
    Deprecated,
}

impl MemoryEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryEventType::Extracted => "extracted",
            MemoryEventType::Reinforced => "reinforced",
            MemoryEventType::Retrieved => "retrieved",
            MemoryEventType::Merged => "merged",
            MemoryEventType::Conflicted => "conflicted",
            MemoryEventType::Deprecated => "deprecated",
        }
    }
}

impl std::str::FromStr for MemoryEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extracted" => Ok(MemoryEventType::Extracted),
            "reinforced" => Ok(MemoryEventType::Reinforced),
            "retrieved" => Ok(MemoryEventType::Retrieved),
            "merged" => Ok(MemoryEventType::Merged),
            "conflicted" => Ok(MemoryEventType::Conflicted),
            "deprecated" => Ok(MemoryEventType::Deprecated),
            other => Err(format!("unknown event_type: {other}")),
        }
    }
}

/// Append-only memory event (spec section 3, "Memory event"). Never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEvent {
    pub event_id: String,
    pub memory_id: String,
    pub event_type: MemoryEventType,
    pub source: String,
    pub signal_strength: f64,
    /// Raw context that produced the event, truncated to 500 chars at write
    /// time by the LTM writer (spec section 4.3).
    pub raw_context: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Truncate to at most `max_chars` Unicode scalar values, matching the
/// writer's 500-char raw_context cap.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_respects_unicode_boundaries() {
        let s = "héllo wörld";
        let truncated = truncate_chars(s, 5);
        assert_eq!(truncated.chars().count(), 5);
    }

    #[test]
    fn truncate_chars_noop_when_shorter() {
        assert_eq!(truncate_chars("short", 500), "short");
    }

    #[test]
    fn episodic_invariant_requires_expiry() {
        let mut m = sample_memory(MemoryKind::Episodic);
        m.expires_at = None;
        assert!(!m.episodic_invariant_holds());
        m.expires_at = Some(m.created_at + chrono::Duration::hours(1));
        assert!(m.episodic_invariant_holds());
    }

    fn sample_memory(kind: MemoryKind) -> Memory {
        let now = Utc::now();
        Memory {
            memory_id: "m1".into(),
            user_id: "u1".into(),
            memory_kind: kind,
            category: "technical_context".into(),
            topic: "language".into(),
            fact: "User prefers Rust".into(),
            importance: 1.0,
            confidence_score: 0.9,
            confidence_source: ConfidenceSource::Explicit,
            frequency: 1,
            evidence_count: 1,
            status: MemoryStatus::Active,
            embedding: None,
            metadata: serde_json::json!({}),
            expires_at: None,
            created_at: now,
            last_updated: now,
            last_accessed: None,
        }
    }
}
