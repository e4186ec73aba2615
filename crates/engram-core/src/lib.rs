//! # Engram Core
//!
//! The epistemic cognition, persona projection, long-term memory, and
//! retrieval engine that sits between a conversational assistant and its
//! persistent stores. Turns a raw stream of user/assistant exchanges into a
//! durable, queryable, behaviorally-consistent user model, and serves
//! context back into future model calls.
//!
//! ## Subsystems
//!
//! - [`cognition`]: per-field policy resolution, signal → decision.
//! - [`persona`]: block-structured persona projection and confidence-gated
//!   merge.
//! - [`ltm`]: long-term memory writer and episodic decay.
//! - [`consolidation`]: duplicate merging and topic canonicalization.
//! - [`retrieval`]: hybrid vector+token retrieval with intent classification.
//! - [`stm`]: short-term state entries, session scratchpad, intent gate.
//! - [`orchestrator`]: per-turn glue and the background worker queue.
//! - [`epistemic`]: the versioned cross-cutting rule set.
//! - [`storage`]: the SQLite-backed persistent schema.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use engram_core::{EngramConfig, Orchestrator, Storage};
//!
//! let config = EngramConfig::from_env();
//! let storage = Arc::new(Storage::open(Some(config.db_path))?);
//! let orchestrator = Orchestrator::new(storage, embedder, extractor, chat_model, object_store)?;
//! let reply = orchestrator.process_turn("user-1", "session-1", "hello", "be concise").await?;
//! ```

pub mod config;
pub mod embeddings;
pub mod extraction;
pub mod memory;
pub mod object_store;
pub mod storage;

pub mod cognition;
pub mod consolidation;
pub mod epistemic;
pub mod ltm;
pub mod orchestrator;
pub mod persona;
pub mod retrieval;
pub mod stm;

pub use config::EngramConfig;
pub use embeddings::{EmbeddingError, EmbeddingProvider, HashingEmbedder};
pub use extraction::{ChatModel, EchoChatModel, NullExtractor, StructuredExtractor};
pub use memory::{ConfidenceSource, Memory, MemoryEvent, MemoryKind, MemoryStatus};
pub use object_store::{LocalObjectStore, ObjectStore};
pub use orchestrator::{Orchestrator, OrchestratorError, TurnReply};
pub use storage::{Storage, StorageError};

/// Crate version, surfaced for diagnostics and the liveness endpoint.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed embedding width. Every [`EmbeddingProvider`] must produce vectors of
/// exactly this length; [`storage::Storage`] rejects anything else at the
/// boundary (see `DESIGN.md` for the Open Question resolution).
pub const EMBEDDING_DIMENSIONS: usize = 1024;
