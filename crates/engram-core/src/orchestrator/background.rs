//! [C15] Background worker: a single consumer draining an unbounded FIFO
//! queue of fire-and-forget jobs, in-process. Grounded on
//! `original_source/MEMORY_SYSTEM/runtime/background_worker.py`'s
//! `background_worker`/`submit_background_task` — the coroutine-factory
//! queue becomes a typed job enum over `tokio::sync::mpsc`, the idiomatic
//! Rust analogue; crate: `tokio` (teacher's async runtime throughout).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::cognition::CognitionEngine;
use crate::embeddings::EmbeddingProvider;
use crate::epistemic::EpistemicEngine;
use crate::extraction::StructuredExtractor;
use crate::ltm;
use crate::object_store::ObjectStore;
use crate::orchestrator::artifacts;
use crate::persona;
use crate::stm::SessionScratchpad;
use crate::storage::Storage;

/// One enqueued job. Mirrors the three background dispatches of spec
/// section 4.7 step 8: persona learning, LTM extraction, artifact
/// materialization.
pub enum BackgroundJob {
    PersonaLearning { user_id: String, user_message: String, assistant_message: String },
    LtmExtraction { user_id: String, user_message: String, assistant_message: String },
    ArtifactMaterialization { user_id: String, session_id: String, response: String },
}

/// Dependencies the worker needs, cloned (as `Arc`s) out of the
/// `Orchestrator` that spawned it. Holds no state of its own beyond what's
/// shared with the foreground path.
#[derive(Clone)]
pub struct BackgroundDeps {
    pub storage: Arc<Storage>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub extractor: Arc<dyn StructuredExtractor>,
    pub object_store: Arc<dyn ObjectStore>,
    pub cognition: Arc<CognitionEngine>,
    pub epistemic: Arc<EpistemicEngine>,
    pub sessions: Arc<Mutex<HashMap<String, SessionScratchpad>>>,
}

/// Drains `rx` forever. A job that fails is logged and dropped; per spec
/// section 7 ("Propagation"), background tasks must never propagate a
/// failure back to the foreground path.
pub async fn run_worker(mut rx: mpsc::UnboundedReceiver<BackgroundJob>, deps: BackgroundDeps) {
    tracing::info!("background worker started");
    while let Some(job) = rx.recv().await {
        let result = match &job {
            BackgroundJob::PersonaLearning { user_id, user_message, assistant_message } => {
                handle_persona_learning(&deps, user_id, user_message, assistant_message).await
            }
            BackgroundJob::LtmExtraction { user_id, user_message, assistant_message } => {
                handle_ltm_extraction(&deps, user_id, user_message, assistant_message).await
            }
            BackgroundJob::ArtifactMaterialization { user_id, session_id, response } => {
                handle_artifact_materialization(&deps, user_id, session_id, response).await
            }
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, "background job failed");
        }
    }
    tracing::info!("background worker shut down (sender dropped)");
}

async fn handle_persona_learning(
    deps: &BackgroundDeps,
    user_id: &str,
    user_message: &str,
    assistant_message: &str,
) -> Result<(), String> {
    let signals = deps
        .extractor
        .extract_signals(user_message, assistant_message)
        .await
        .map_err(|e| e.to_string())?;
    if signals.is_empty() {
        return Ok(());
    }

    let decisions = deps.cognition.run(user_id, &signals, deps.storage.as_ref(), deps.storage.as_ref());
    let projected = persona::project(&signals, &decisions);

    let stored = deps.storage.get_persona(user_id).map_err(|e| e.to_string())?;
    let merged = persona::merge_persona(deps.epistemic.as_ref(), &stored, &projected);
    deps.storage.upsert_persona(&merged).map_err(|e| e.to_string())?;
    Ok(())
}

async fn handle_ltm_extraction(
    deps: &BackgroundDeps,
    user_id: &str,
    user_message: &str,
    assistant_message: &str,
) -> Result<(), String> {
    let facts = deps
        .extractor
        .extract_facts(user_message, assistant_message)
        .await
        .map_err(|e| e.to_string())?;
    if facts.facts.is_empty() && facts.episodic.is_empty() {
        return Ok(());
    }

    let raw_context = format!("user: {user_message}\nassistant: {assistant_message}");
    let report = ltm::write_facts(
        deps.storage.as_ref(),
        deps.embedder.as_ref(),
        deps.epistemic.as_ref(),
        user_id,
        &facts,
        &raw_context,
    )
    .await
    .map_err(|e| e.to_string())?;
    tracing::debug!(
        reinforced = report.reinforced,
        inserted = report.inserted,
        episodic_inserted = report.episodic_inserted,
        skipped = report.skipped,
        "ltm extraction complete"
    );
    Ok(())
}

async fn handle_artifact_materialization(
    deps: &BackgroundDeps,
    user_id: &str,
    session_id: &str,
    response: &str,
) -> Result<(), String> {
    let artifact_id = uuid::Uuid::new_v4().to_string();
    let content_ref = deps
        .object_store
        .write("email", &artifact_id, response)
        .await
        .map_err(|e| e.to_string())?;

    let summary = artifacts::summarize(response);
    let metadata = serde_json::json!({"source": "llm", "created_by": user_id, "route": "current_context"});
    deps.storage
        .insert_artifact(&artifact_id, "email", Some(&summary), &metadata, &content_ref)
        .map_err(|e| e.to_string())?;

    if let Ok(mut sessions) = deps.sessions.lock() {
        if let Some(scratchpad) = sessions.get_mut(session_id) {
            scratchpad.push_event("artifact_created", &artifact_id);
        }
    }

    Ok(())
}
