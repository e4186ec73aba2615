//! [C2] Structured Extractor — trait only (external collaborator per spec
//! section 1). Grounded in `original_source/MEMORY_SYSTEM/EXTRACTOR` (fact
//! schema) and `stm/extract_stm.py` + `stm/stm_orchestrator.py` (combined
//! STM+route intent shape), expressed as an async trait the way
//! `vestige-mcp`'s protocol layer uses `async-trait` throughout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cognition::Signal;

/// Extractor error. Per spec section 7, null/schema-mismatched structured
/// output is NOT an error — it is "nothing extracted" and the pipeline
/// continues. This type exists only for genuine backend failures (the LLM
/// call itself failing).
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractionError {
    #[error("extractor backend unavailable: {0}")]
    Unavailable(String),
}

/// One atomic fact pulled out of a conversation turn, prior to embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedFact {
    pub category: String,
    pub topic: String,
    pub fact: String,
    pub importance: f64,
    pub confidence: f64,
}

/// TTL scope for an episodic extraction (spec section 4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodicScope {
    Session,
    MultiTurn,
    Task,
}

impl EpisodicScope {
    pub fn ttl(&self) -> chrono::Duration {
        match self {
            EpisodicScope::Session => chrono::Duration::hours(1),
            EpisodicScope::MultiTurn => chrono::Duration::hours(6),
            EpisodicScope::Task => chrono::Duration::hours(48),
        }
    }
}

/// One episodic extraction, prior to embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedEpisodic {
    pub scope: EpisodicScope,
    pub key: String,
    pub value: String,
    pub confidence: f64,
}

/// Output of the combined factual/episodic extraction pass (C9's input).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedFacts {
    pub facts: Vec<ExtractedFact>,
    pub episodic: Vec<ExtractedEpisodic>,
}

/// Route classification applied every turn (spec section 4.7 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    CurrentContext,
    Edit,
    Reference,
    SemanticLookup,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::CurrentContext => "current_context",
            Route::Edit => "edit",
            Route::Reference => "reference",
            Route::SemanticLookup => "semantic_lookup",
        }
    }
}

/// STM write proposal, gated by [`crate::stm::gate`] before commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StmIntent {
    pub should_write: bool,
    pub state_type: Option<String>,
    pub statement: Option<String>,
    pub rationale: Option<String>,
    pub applies_to: Option<String>,
    pub confidence: f64,
}

/// The combined intent extraction of spec section 4.7 step 1: one LLM call
/// produces both the STM proposal and the route classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnIntent {
    pub stm: StmIntent,
    pub route: Route,
    pub route_confidence: f64,
}

/// The structured-output LLM used for extraction (external collaborator).
/// Three methods mirror the three extraction call-sites of
/// `original_source/MEMORY_SYSTEM/EXTRACTOR`: persona signals, factual +
/// episodic facts, and the combined turn intent.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract_signals(
        &self,
        user_message: &str,
        assistant_message: &str,
    ) -> Result<Vec<Signal>, ExtractionError>;

    async fn extract_facts(
        &self,
        user_message: &str,
        assistant_message: &str,
    ) -> Result<ExtractedFacts, ExtractionError>;

    async fn extract_turn_intent(&self, user_message: &str) -> Result<TurnIntent, ExtractionError>;
}

/// Default extractor: always returns empty/low-confidence results. Lets the
/// orchestrator run end to end without a real LLM wired up, matching C1/C2's
/// treatment as external, optionally-absent collaborators.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExtractor;

#[async_trait]
impl StructuredExtractor for NullExtractor {
    async fn extract_signals(
        &self,
        _user_message: &str,
        _assistant_message: &str,
    ) -> Result<Vec<Signal>, ExtractionError> {
        Ok(Vec::new())
    }

    async fn extract_facts(
        &self,
        _user_message: &str,
        _assistant_message: &str,
    ) -> Result<ExtractedFacts, ExtractionError> {
        Ok(ExtractedFacts::default())
    }

    async fn extract_turn_intent(&self, _user_message: &str) -> Result<TurnIntent, ExtractionError> {
        Ok(TurnIntent {
            stm: StmIntent::default(),
            route: Route::CurrentContext,
            route_confidence: 0.0,
        })
    }
}

/// The chat LLM itself (external collaborator, spec section 1). `EchoChatModel`
/// is a deterministic default so the orchestrator is runnable without a real
/// backend configured, matching C1/C2's treatment.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ExtractionError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EchoChatModel;

#[async_trait]
impl ChatModel for EchoChatModel {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, ExtractionError> {
        Ok(format!("(echo) {user_prompt}"))
    }
}
