//! [C14] Orchestrator: per-turn glue (spec section 4.7). Grounded on
//! `original_source/MEMORY_SYSTEM/stm/stm_orchestrator.py`'s
//! `process_user_message`/`post_model_response`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::cognition::CognitionEngine;
use crate::embeddings::EmbeddingProvider;
use crate::epistemic::{build_prompt_block, default_rules, EpistemicEngine, RuleScope};
use crate::extraction::{ChatModel, ExtractionError, Route, StructuredExtractor};
use crate::memory::Memory;
use crate::object_store::{ObjectStore, ObjectStoreError};
use crate::orchestrator::artifacts;
use crate::orchestrator::background::{self, BackgroundDeps, BackgroundJob};
use crate::persona::StoredPersona;
use crate::retrieval::{self, IntentClassifier, RetrievalResult};
use crate::stm::{self, SessionScratchpad, StmEntry};
use crate::storage::{ArtifactRow, Storage, StorageError};

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("embedding error: {0}")]
    Embedding(#[from] crate::embeddings::EmbeddingError),
    #[error("object store error: {0}")]
    ObjectStore(#[from] ObjectStoreError),
}

/// The orchestrator's answer for one turn, returned to the HTTP handler
/// (spec section 6's `POST /model`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReply {
    pub response: String,
    pub route: Route,
    pub route_confidence: f64,
    pub stm_written: bool,
    pub artifact_queued: bool,
}

/// Owns every collaborator a turn needs and the background job queue that
/// drains the three fire-and-forget jobs spec section 4.7 step 8 enqueues.
pub struct Orchestrator {
    storage: Arc<Storage>,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn StructuredExtractor>,
    chat_model: Arc<dyn ChatModel>,
    cognition: Arc<CognitionEngine>,
    epistemic: Arc<EpistemicEngine>,
    intent_classifier: Arc<IntentClassifier>,
    sessions: Arc<Mutex<HashMap<String, SessionScratchpad>>>,
    background_tx: mpsc::UnboundedSender<BackgroundJob>,
}

impl Orchestrator {
    /// Builds the collaborator set and spawns the single background
    /// consumer task. Must be called from within a Tokio runtime (the
    /// worker is `tokio::spawn`ed immediately).
    pub fn new(
        storage: Arc<Storage>,
        embedder: Arc<dyn EmbeddingProvider>,
        extractor: Arc<dyn StructuredExtractor>,
        chat_model: Arc<dyn ChatModel>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Result<Self, OrchestratorError> {
        let intent_classifier = Arc::new(IntentClassifier::new(embedder.as_ref())?);
        let cognition = Arc::new(CognitionEngine::new());
        let epistemic = Arc::new(EpistemicEngine::new(default_rules()));
        let sessions: Arc<Mutex<HashMap<String, SessionScratchpad>>> = Arc::new(Mutex::new(HashMap::new()));

        let (background_tx, background_rx) = mpsc::unbounded_channel();
        let deps = BackgroundDeps {
            storage: storage.clone(),
            embedder: embedder.clone(),
            extractor: extractor.clone(),
            object_store: object_store.clone(),
            cognition: cognition.clone(),
            epistemic: epistemic.clone(),
            sessions: sessions.clone(),
        };
        tokio::spawn(background::run_worker(background_rx, deps));

        Ok(Self {
            storage,
            embedder,
            extractor,
            chat_model,
            cognition,
            epistemic,
            intent_classifier,
            sessions,
            background_tx,
        })
    }

    /// Process one user turn end to end (spec section 4.7): extract intent,
    /// gate STM, retrieve context per route, assemble prompts, call the
    /// chat model, then enqueue the three background jobs. `system_prompt`
    /// is an operator-supplied prefix (spec section 6's `POST /model` body
    /// field of the same name); it's rendered ahead of the persona and
    /// epistemic context, never in place of it.
    pub async fn process_turn(
        &self,
        user_id: &str,
        session_id: &str,
        user_message: &str,
        system_prompt: &str,
    ) -> Result<TurnReply, OrchestratorError> {
        let turn_intent = self.extractor.extract_turn_intent(user_message).await?;

        {
            let mut sessions = self.sessions.lock().expect("sessions lock poisoned");
            let scratchpad = sessions
                .entry(session_id.to_string())
                .or_insert_with(|| SessionScratchpad::new(session_id));
            scratchpad.set_route(turn_intent.route, turn_intent.route_confidence);
            scratchpad.push_message("user", user_message);
        }

        let stm_written = match stm::evaluate(user_id, &turn_intent.stm) {
            Ok(entry) => {
                self.storage.insert_stm_entry(&entry)?;
                true
            }
            Err(rejection) => {
                tracing::debug!(?rejection, "stm proposal rejected by gate");
                false
            }
        };

        let route_context = self.gather_route_context(user_id, turn_intent.route, user_message).await?;

        let persona = self.storage.get_persona(user_id)?;
        let system_prompt = self.build_system_prompt(system_prompt, &persona);
        let user_prompt = build_user_prompt(&route_context, user_message);

        let response = self.chat_model.complete(&system_prompt, &user_prompt).await?;

        {
            let mut sessions = self.sessions.lock().expect("sessions lock poisoned");
            if let Some(scratchpad) = sessions.get_mut(session_id) {
                scratchpad.push_message("assistant", &response);
            }
        }

        let artifact_queued = artifacts::should_create_artifact(turn_intent.route, &response);
        self.dispatch_background_jobs(user_id, session_id, user_message, &response, artifact_queued);

        Ok(TurnReply {
            response,
            route: turn_intent.route,
            route_confidence: turn_intent.route_confidence,
            stm_written,
            artifact_queued,
        })
    }

    async fn gather_route_context(&self, user_id: &str, route: Route, user_message: &str) -> Result<RouteContext, OrchestratorError> {
        match route {
            Route::CurrentContext => {
                let stm_snapshot = self.storage.list_active_stm(user_id)?;
                let retrieval = retrieval::retrieve(
                    self.storage.as_ref(),
                    self.embedder.as_ref(),
                    self.intent_classifier.as_ref(),
                    user_id,
                    user_message,
                )?;
                Ok(RouteContext::CurrentContext { stm_snapshot, retrieval })
            }
            Route::Edit => {
                let artifact = self.storage.list_recent_artifacts(1)?.into_iter().next();
                Ok(RouteContext::Edit { artifact })
            }
            Route::Reference | Route::SemanticLookup => {
                let summaries = self.storage.list_recent_artifacts(10)?;
                Ok(RouteContext::ArtifactSummaries { summaries })
            }
        }
    }

    fn build_system_prompt(&self, operator_prefix: &str, persona: &StoredPersona) -> String {
        let mut sections = Vec::new();
        if !operator_prefix.trim().is_empty() {
            sections.push(operator_prefix.trim().to_string());
        }

        let persona_block = render_persona(persona);
        if !persona_block.is_empty() {
            sections.push(format!("KNOWN USER CONTEXT:\n{persona_block}"));
        }

        let reasoning_rules = build_prompt_block(self.epistemic.rules(), RuleScope::Reasoning);
        if !reasoning_rules.is_empty() {
            sections.push(reasoning_rules);
        }

        sections.join("\n\n")
    }

    fn dispatch_background_jobs(&self, user_id: &str, session_id: &str, user_message: &str, response: &str, artifact_queued: bool) {
        let _ = self.background_tx.send(BackgroundJob::PersonaLearning {
            user_id: user_id.to_string(),
            user_message: user_message.to_string(),
            assistant_message: response.to_string(),
        });
        let _ = self.background_tx.send(BackgroundJob::LtmExtraction {
            user_id: user_id.to_string(),
            user_message: user_message.to_string(),
            assistant_message: response.to_string(),
        });
        if artifact_queued {
            let _ = self.background_tx.send(BackgroundJob::ArtifactMaterialization {
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
                response: response.to_string(),
            });
        }
    }
}

/// What retrieval produced for this turn's route (spec section 4.7 step 5).
enum RouteContext {
    CurrentContext { stm_snapshot: Vec<StmEntry>, retrieval: RetrievalResult },
    Edit { artifact: Option<ArtifactRow> },
    ArtifactSummaries { summaries: Vec<ArtifactRow> },
}

fn build_user_prompt(context: &RouteContext, user_message: &str) -> String {
    let mut sections = Vec::new();

    match context {
        RouteContext::CurrentContext { stm_snapshot, retrieval } => {
            if !stm_snapshot.is_empty() {
                sections.push(format!("ACTIVE STATE:\n{}", render_stm(stm_snapshot)));
            }
            if !retrieval.episodic.is_empty() {
                sections.push(format!("RECENT CONTEXT:\n{}", render_memories(&retrieval.episodic)));
            }
            if !retrieval.factual.is_empty() {
                sections.push(format!("KNOWN FACTS:\n{}", render_memories(&retrieval.factual)));
            }
        }
        RouteContext::Edit { artifact } => {
            if let Some(artifact) = artifact {
                sections.push(format!(
                    "ARTIFACT TO EDIT ({}): {}",
                    artifact.artifact_id,
                    artifact.summary.as_deref().unwrap_or("(no summary)")
                ));
            }
        }
        RouteContext::ArtifactSummaries { summaries } => {
            if !summaries.is_empty() {
                let lines: Vec<String> = summaries
                    .iter()
                    .map(|a| format!("- {} ({}): {}", a.artifact_id, a.artifact_type, a.summary.as_deref().unwrap_or("(no summary)")))
                    .collect();
                sections.push(format!("KNOWN ARTIFACTS:\n{}", lines.join("\n")));
            }
        }
    }

    sections.push(user_message.to_string());
    sections.join("\n\n")
}

fn render_stm(entries: &[StmEntry]) -> String {
    entries.iter().map(|e| format!("- [{}] {}", e.state_type.as_str(), e.statement)).collect::<Vec<_>>().join("\n")
}

fn render_memories(memories: &[Memory]) -> String {
    memories.iter().map(|m| format!("- {}", m.fact)).collect::<Vec<_>>().join("\n")
}

fn render_persona(persona: &StoredPersona) -> String {
    persona
        .blocks
        .iter()
        .map(|(name, value)| format!("- {name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
