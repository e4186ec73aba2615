//! STM entry type (spec section 3), grounded in
//! `original_source/MEMORY_SYSTEM/stm/{stm_models.py,stm_schema.py}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of STM state types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateType {
    Goal,
    Decision,
    Constraint,
    Approval,
    Rejection,
    DirectionChange,
    Scope,
}

impl StateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateType::Goal => "goal",
            StateType::Decision => "decision",
            StateType::Constraint => "constraint",
            StateType::Approval => "approval",
            StateType::Rejection => "rejection",
            StateType::DirectionChange => "direction_change",
            StateType::Scope => "scope",
        }
    }
}

impl std::str::FromStr for StateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "goal" => Ok(StateType::Goal),
            "decision" => Ok(StateType::Decision),
            "constraint" => Ok(StateType::Constraint),
            "approval" => Ok(StateType::Approval),
            "rejection" => Ok(StateType::Rejection),
            "direction_change" => Ok(StateType::DirectionChange),
            "scope" => Ok(StateType::Scope),
            other => Err(format!("unknown state_type: {other}")),
        }
    }
}

/// An authoritative, supersedable statement of user state (spec section 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StmEntry {
    pub stm_id: String,
    pub user_id: String,
    pub state_type: StateType,
    pub statement: String,
    pub rationale: Option<String>,
    pub applies_to: Option<String>,
    /// `stm_id` of the entry this one deactivates. The writer applies the
    /// deactivation atomically alongside this row's insert (spec section 3
    /// invariant).
    pub supersedes: Option<String>,
    pub confidence: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl StmEntry {
    pub fn new(
        user_id: impl Into<String>,
        state_type: StateType,
        statement: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            stm_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            state_type,
            statement: statement.into(),
            rationale: None,
            applies_to: None,
            supersedes: None,
            confidence,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
