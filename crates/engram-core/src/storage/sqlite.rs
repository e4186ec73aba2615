//! SQLite-backed storage implementation.
//!
//! Grounded in `vestige-core/src/storage/sqlite.rs`'s `Storage` shape:
//! separate reader/writer `Mutex<Connection>` so all methods take `&self`
//! and `Storage` stays `Send + Sync` (callers hold `Arc<Storage>`, not
//! `Arc<Mutex<Storage>>`), the same `configure_connection` PRAGMA block, and
//! an LRU query-embedding cache. The vector index itself is a small
//! in-process cosine scan rather than the teacher's `usearch`-backed
//! `VectorIndex` — spec.md's memory counts don't warrant an ANN index, and
//! the external store is specified only at the `EmbeddingProvider`/storage
//! boundary (see DESIGN.md's "Dependencies dropped").

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use lru::LruCache;
use rusqlite::{params, Connection, OptionalExtension};

use crate::cognition::{Action, Decision, Signal, Target};
use crate::embeddings::cosine_distance;
use crate::memory::{ConfidenceSource, Memory, MemoryEvent, MemoryEventType, MemoryKind, MemoryStatus};
use crate::persona::{StoredPersona, BLOCK_NAMES};
use crate::stm::{StateType, StmEntry};

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("initialization error: {0}")]
    Init(String),
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("{0}")]
    Rejected(#[from] crate::epistemic::EpistemicViolation),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// An artifact metadata row (spec section 6, "artifacts").
#[derive(Debug, Clone)]
pub struct ArtifactRow {
    pub artifact_id: String,
    pub artifact_type: String,
    pub summary: Option<String>,
    pub metadata: serde_json::Value,
    pub content_ref: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// A pattern-log row as stored (spec section 3, "Pattern log").
#[derive(Debug, Clone)]
pub struct PatternLogRow {
    pub id: String,
    pub user_id: String,
    pub signal_category: String,
    pub signal_field: String,
    pub signal_value: serde_json::Value,
    pub action: String,
    pub target: Option<String>,
    pub confidence: f64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Main storage struct. Uses separate reader/writer connections for
/// interior mutability so all methods take `&self`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    /// LRU cache for query embeddings, keyed by the raw query chunk text
    /// (spec section 4.6's retriever calls through here for repeated
    /// sub-queries within a session).
    query_cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl Storage {
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Open (and migrate) the store at `db_path`, or under the platform
    /// data directory if `None`.
    pub fn open(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("ai", "engram", "core")
                    .ok_or_else(|| StorageError::Init("could not determine project directories".to_string()))?;
                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                data_dir.join("engram.db")
            }
        };

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        let query_cache = LruCache::new(NonZeroUsize::new(256).expect("256 is non-zero"));

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            query_cache: Mutex::new(query_cache),
        })
    }

    /// Open an ephemeral in-memory store. Each call gets its own isolated
    /// database — useful for tests.
    ///
    /// A bare `Connection::open_in_memory()` for the reader would attach to
    /// a *second*, private database distinct from the writer's, so every
    /// read would see an empty store. Both connections instead open the
    /// same `file::memory:?cache=shared` URI, which SQLite keeps alive and
    /// visible to any connection naming it as long as one stays open.
    pub fn open_in_memory() -> Result<Self> {
        const SHARED_MEMORY_URI: &str = "file::memory:?cache=shared";
        let open_flags = rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
            | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
            | rusqlite::OpenFlags::SQLITE_OPEN_URI;

        let writer_conn = Connection::open_with_flags(SHARED_MEMORY_URI, open_flags)?;
        Self::configure_connection(&writer_conn)?;
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open_with_flags(SHARED_MEMORY_URI, open_flags)?;
        Self::configure_connection(&reader_conn)?;

        let query_cache = LruCache::new(NonZeroUsize::new(256).expect("256 is non-zero"));
        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            query_cache: Mutex::new(query_cache),
        })
    }

    pub fn cached_embedding(&self, query: &str) -> Option<Vec<f32>> {
        self.query_cache.lock().expect("query cache lock poisoned").get(query).cloned()
    }

    pub fn cache_embedding(&self, query: &str, embedding: Vec<f32>) {
        self.query_cache
            .lock()
            .expect("query cache lock poisoned")
            .put(query.to_string(), embedding);
    }

    // ------------------------------------------------------------------
    // Memories (C3)
    // ------------------------------------------------------------------

    pub fn insert_memory(&self, memory: &Memory) -> Result<()> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        let embedding_blob = memory.embedding.as_deref().map(embedding_to_bytes);
        conn.execute(
            "INSERT INTO memories (
                memory_id, user_id, memory_kind, category, topic, fact,
                importance, confidence_score, confidence_source, frequency,
                evidence_count, status, embedding, metadata, expires_at,
                created_at, last_updated, last_accessed
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18)",
            params![
                memory.memory_id,
                memory.user_id,
                memory.memory_kind.as_str(),
                memory.category,
                memory.topic,
                memory.fact,
                memory.importance,
                memory.confidence_score,
                memory.confidence_source.as_str(),
                memory.frequency,
                memory.evidence_count,
                memory.status.as_str(),
                embedding_blob,
                memory.metadata,
                memory.expires_at,
                memory.created_at,
                memory.last_updated,
                memory.last_accessed,
            ],
        )?;
        Ok(())
    }

    fn row_to_memory(row: &rusqlite::Row) -> rusqlite::Result<Memory> {
        let kind_str: String = row.get("memory_kind")?;
        let status_str: String = row.get("status")?;
        let source_str: String = row.get("confidence_source")?;
        let embedding_blob: Option<Vec<u8>> = row.get("embedding")?;

        Ok(Memory {
            memory_id: row.get("memory_id")?,
            user_id: row.get("user_id")?,
            memory_kind: kind_str.parse().unwrap_or(MemoryKind::Factual),
            category: row.get("category")?,
            topic: row.get("topic")?,
            fact: row.get("fact")?,
            importance: row.get("importance")?,
            confidence_score: row.get("confidence_score")?,
            confidence_source: source_str.parse().unwrap_or(ConfidenceSource::Derived),
            frequency: row.get("frequency")?,
            evidence_count: row.get("evidence_count")?,
            status: status_str.parse().unwrap_or(MemoryStatus::Active),
            embedding: embedding_blob.map(|b| bytes_to_embedding(&b)),
            metadata: row.get("metadata")?,
            expires_at: row.get("expires_at")?,
            created_at: row.get("created_at")?,
            last_updated: row.get("last_updated")?,
            last_accessed: row.get("last_accessed")?,
        })
    }

    pub fn get_memory(&self, memory_id: &str) -> Result<Option<Memory>> {
        let conn = self.reader.lock().expect("reader lock poisoned");
        conn.query_row("SELECT * FROM memories WHERE memory_id = ?1", params![memory_id], Self::row_to_memory)
            .optional()
            .map_err(StorageError::from)
    }

    pub fn list_active_factual(&self, user_id: &str) -> Result<Vec<Memory>> {
        self.list_by_kind_status(user_id, MemoryKind::Factual, &[MemoryStatus::Active])
    }

    pub fn list_active_episodic(&self, user_id: &str) -> Result<Vec<Memory>> {
        let conn = self.reader.lock().expect("reader lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT * FROM memories
             WHERE user_id = ?1 AND memory_kind = 'episodic'
               AND expires_at IS NOT NULL AND expires_at > ?2
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id, Utc::now()], Self::row_to_memory)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    fn list_by_kind_status(&self, user_id: &str, kind: MemoryKind, statuses: &[MemoryStatus]) -> Result<Vec<Memory>> {
        let conn = self.reader.lock().expect("reader lock poisoned");
        let placeholders: Vec<String> = (0..statuses.len()).map(|i| format!("?{}", i + 3)).collect();
        let sql = format!(
            "SELECT * FROM memories WHERE user_id = ?1 AND memory_kind = ?2 AND status IN ({})",
            placeholders.join(",")
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut bound: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id.to_string()), Box::new(kind.as_str())];
        for s in statuses {
            bound.push(Box::new(s.as_str()));
        }
        let param_refs: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|b| b.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), Self::row_to_memory)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    /// Retrieval's candidate pool (spec section 4.6): active (optionally
    /// plus supporting) factual rows at or above `min_confidence`.
    pub fn list_retrievable_factual(&self, user_id: &str, min_confidence: f64, include_supporting: bool) -> Result<Vec<Memory>> {
        let mut statuses = vec![MemoryStatus::Active];
        if include_supporting {
            statuses.push(MemoryStatus::Supporting);
        }
        let rows = self.list_by_kind_status(user_id, MemoryKind::Factual, &statuses)?;
        Ok(rows.into_iter().filter(|m| m.confidence_score >= min_confidence).collect())
    }

    /// Consolidation's load order (spec section 4.4): `(confidence DESC,
    /// evidence_count DESC, last_seen_at DESC)`. `last_accessed` stands in
    /// for `last_seen_at` (see DESIGN.md's Open Question note); falls back
    /// to `last_updated` when a row has never been retrieved.
    pub fn list_active_for_consolidation(&self, user_id: &str, kind: MemoryKind) -> Result<Vec<Memory>> {
        let conn = self.reader.lock().expect("reader lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT * FROM memories
             WHERE user_id = ?1 AND memory_kind = ?2 AND status = 'active'
             ORDER BY confidence_score DESC, evidence_count DESC, COALESCE(last_accessed, last_updated) DESC",
        )?;
        let rows = stmt.query_map(params![user_id, kind.as_str()], Self::row_to_memory)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    /// Dedup lookup for C9: nearest active factual memory for this user by
    /// cosine distance. Scans in-process since no ANN index is maintained
    /// (see module docs).
    pub fn find_nearest_active_factual(&self, user_id: &str, embedding: &[f32]) -> Result<Option<(Memory, f32)>> {
        let candidates = self.list_active_factual(user_id)?;
        let mut best: Option<(Memory, f32)> = None;
        for candidate in candidates {
            let Some(candidate_embedding) = &candidate.embedding else {
                continue;
            };
            let distance = cosine_distance(embedding, candidate_embedding);
            match &best {
                Some((_, best_distance)) if *best_distance <= distance => {}
                _ => best = Some((candidate, distance)),
            }
        }
        Ok(best)
    }

    /// Reinforce an existing factual memory in place (spec section 4.3):
    /// `frequency += 1`, `importance = min(importance + increment,
    /// max_importance)`, `last_updated = now`. Returns the updated row.
    pub fn reinforce_memory(&self, memory_id: &str, importance_increment: f64, max_importance: f64) -> Result<Memory> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        let now = Utc::now();
        conn.execute(
            "UPDATE memories
             SET frequency = frequency + 1,
                 importance = MIN(importance + ?2, ?3),
                 last_updated = ?4
             WHERE memory_id = ?1",
            params![memory_id, importance_increment, max_importance, now],
        )?;
        drop(conn);
        self.get_memory(memory_id)?.ok_or_else(|| StorageError::NotFound(memory_id.to_string()))
    }

    pub fn update_memory_status(&self, memory_id: &str, status: MemoryStatus) -> Result<()> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        conn.execute(
            "UPDATE memories SET status = ?2 WHERE memory_id = ?1",
            params![memory_id, status.as_str()],
        )?;
        Ok(())
    }

    pub fn bump_evidence_count(&self, memory_id: &str, by: i64) -> Result<()> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        conn.execute(
            "UPDATE memories SET evidence_count = evidence_count + ?2, last_accessed = ?3 WHERE memory_id = ?1",
            params![memory_id, by, Utc::now()],
        )?;
        Ok(())
    }

    pub fn touch_last_accessed(&self, memory_id: &str) -> Result<()> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        conn.execute(
            "UPDATE memories SET last_accessed = ?2 WHERE memory_id = ?1",
            params![memory_id, Utc::now()],
        )?;
        Ok(())
    }

    /// Episodic decay (C11): delete expired episodic rows. Idempotent — a
    /// re-run after rows are gone is a no-op DELETE.
    pub fn delete_expired_episodic(&self, at: DateTime<Utc>) -> Result<u64> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        let affected = conn.execute(
            "DELETE FROM memories WHERE memory_kind = 'episodic' AND expires_at IS NOT NULL AND expires_at < ?1",
            params![at],
        )?;
        Ok(affected as u64)
    }

    pub fn append_event(&self, event: &MemoryEvent) -> Result<()> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        conn.execute(
            "INSERT INTO memory_events (
                event_id, memory_id, event_type, source, signal_strength,
                raw_context, metadata, created_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                event.event_id,
                event.memory_id,
                event.event_type.as_str(),
                event.source,
                event.signal_strength,
                event.raw_context,
                event.metadata,
                event.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_memory(&self, memory_id: &str) -> Result<Vec<MemoryEvent>> {
        let conn = self.reader.lock().expect("reader lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT event_id, memory_id, event_type, source, signal_strength, raw_context, metadata, created_at
             FROM memory_events WHERE memory_id = ?1 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map(params![memory_id], |row| {
            let event_type: String = row.get(2)?;
            Ok(MemoryEvent {
                event_id: row.get(0)?,
                memory_id: row.get(1)?,
                event_type: event_type.parse().unwrap_or(MemoryEventType::Extracted),
                source: row.get(3)?,
                signal_strength: row.get(4)?,
                raw_context: row.get(5)?,
                metadata: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    // ------------------------------------------------------------------
    // Persona (C4)
    // ------------------------------------------------------------------

    pub fn get_persona(&self, user_id: &str) -> Result<StoredPersona> {
        let conn = self.reader.lock().expect("reader lock poisoned");
        let found = conn
            .query_row(
                "SELECT user_identity, company_profile, company_business, company_products,
                        company_brand, objective, content_format, audience, tone, writing_style,
                        language, constraints, last_updated
                 FROM user_persona WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let mut persona = StoredPersona::new(user_id);
                    for (i, name) in BLOCK_NAMES.iter().enumerate() {
                        let value: Option<serde_json::Value> = row.get(i)?;
                        if let Some(v) = value {
                            persona.blocks.insert((*name).to_string(), v);
                        }
                    }
                    persona.last_updated = row.get(BLOCK_NAMES.len())?;
                    Ok(persona)
                },
            )
            .optional()?;
        Ok(found.unwrap_or_else(|| StoredPersona::new(user_id)))
    }

    /// Writes the entire persona row in one upsert (spec section 4.2: "the
    /// merger writes the entire persona row in one upsert").
    pub fn upsert_persona(&self, persona: &StoredPersona) -> Result<()> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        let values: Vec<Option<serde_json::Value>> =
            BLOCK_NAMES.iter().map(|name| persona.blocks.get(*name).cloned()).collect();

        conn.execute(
            "INSERT INTO user_persona (
                user_id, user_identity, company_profile, company_business, company_products,
                company_brand, objective, content_format, audience, tone, writing_style,
                language, constraints, last_updated
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14)
            ON CONFLICT(user_id) DO UPDATE SET
                user_identity = excluded.user_identity,
                company_profile = excluded.company_profile,
                company_business = excluded.company_business,
                company_products = excluded.company_products,
                company_brand = excluded.company_brand,
                objective = excluded.objective,
                content_format = excluded.content_format,
                audience = excluded.audience,
                tone = excluded.tone,
                writing_style = excluded.writing_style,
                language = excluded.language,
                constraints = excluded.constraints,
                last_updated = excluded.last_updated",
            params![
                persona.user_id,
                values[0],
                values[1],
                values[2],
                values[3],
                values[4],
                values[5],
                values[6],
                values[7],
                values[8],
                values[9],
                values[10],
                values[11],
                persona.last_updated.unwrap_or_else(Utc::now),
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // STM (C5/C13)
    // ------------------------------------------------------------------

    pub fn insert_stm_entry(&self, entry: &StmEntry) -> Result<()> {
        let mut conn = self.writer.lock().expect("writer lock poisoned");
        let tx = conn.transaction()?;
        if let Some(superseded) = &entry.supersedes {
            tx.execute(
                "UPDATE stm_entries SET is_active = 0 WHERE stm_id = ?1",
                params![superseded],
            )?;
        }
        tx.execute(
            "INSERT INTO stm_entries (
                stm_id, user_id, state_type, statement, rationale, applies_to,
                supersedes, confidence, is_active, created_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            params![
                entry.stm_id,
                entry.user_id,
                entry.state_type.as_str(),
                entry.statement,
                entry.rationale,
                entry.applies_to,
                entry.supersedes,
                entry.confidence,
                entry.is_active,
                entry.created_at,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn list_active_stm(&self, user_id: &str) -> Result<Vec<StmEntry>> {
        let conn = self.reader.lock().expect("reader lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT stm_id, user_id, state_type, statement, rationale, applies_to,
                    supersedes, confidence, is_active, created_at
             FROM stm_entries WHERE user_id = ?1 AND is_active = 1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let state_type: String = row.get(2)?;
            Ok(StmEntry {
                stm_id: row.get(0)?,
                user_id: row.get(1)?,
                state_type: state_type.parse().unwrap_or(StateType::Goal),
                statement: row.get(3)?,
                rationale: row.get(4)?,
                applies_to: row.get(5)?,
                supersedes: row.get(6)?,
                confidence: row.get(7)?,
                is_active: row.get(8)?,
                created_at: row.get(9)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }

    // ------------------------------------------------------------------
    // Pattern log (C6)
    // ------------------------------------------------------------------

    pub fn insert_pattern_log(&self, user_id: &str, signal: &Signal, decision: &Decision) -> Result<()> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        conn.execute(
            "INSERT INTO pattern_logs (
                id, user_id, signal_category, signal_field, signal_value,
                action, target, confidence, reason, created_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            params![
                uuid::Uuid::new_v4().to_string(),
                user_id,
                signal.category,
                signal.field,
                signal.value,
                decision.action.as_str(),
                decision.target.map(target_as_str),
                decision.confidence,
                decision.reason,
                Utc::now(),
            ],
        )?;
        Ok(())
    }

    /// Counts prior `(category, field, value)` pattern-log rows for a user —
    /// the frequency lookup [`crate::cognition::frequency::FrequencyLookup`]
    /// needs before cognition runs (spec section 4.1).
    pub fn count_prior_signal(
        &self,
        user_id: &str,
        category: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<u32> {
        let conn = self.reader.lock().expect("reader lock poisoned");
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pattern_logs
             WHERE user_id = ?1 AND signal_category = ?2 AND signal_field = ?3 AND signal_value = ?4",
            params![user_id, category, field, value],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u32)
    }

    // ------------------------------------------------------------------
    // Artifacts
    // ------------------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn insert_artifact(
        &self,
        artifact_id: &str,
        artifact_type: &str,
        summary: Option<&str>,
        metadata: &serde_json::Value,
        content_ref: &str,
    ) -> Result<()> {
        let conn = self.writer.lock().expect("writer lock poisoned");
        let now = Utc::now();
        conn.execute(
            "INSERT INTO artifacts (
                artifact_id, artifact_type, summary, metadata, content_ref,
                created_at, last_updated_at
            ) VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![artifact_id, artifact_type, summary, metadata, content_ref, now, now],
        )?;
        Ok(())
    }

    /// Most recently created artifacts, newest first, for the orchestrator's
    /// `edit`/`reference`/`semantic_lookup` routes (spec section 4.7 step 5).
    /// The schema carries no `user_id` column (spec section 6); callers that
    /// need per-user scoping filter on the `created_by` key artifact writers
    /// set in `metadata`.
    pub fn list_recent_artifacts(&self, limit: i64) -> Result<Vec<ArtifactRow>> {
        let conn = self.reader.lock().expect("reader lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT artifact_id, artifact_type, summary, metadata, content_ref, created_at, last_updated_at
             FROM artifacts ORDER BY created_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(ArtifactRow {
                artifact_id: row.get(0)?,
                artifact_type: row.get(1)?,
                summary: row.get(2)?,
                metadata: row.get(3)?,
                content_ref: row.get(4)?,
                created_at: row.get(5)?,
                last_updated_at: row.get(6)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StorageError::from)
    }
}

fn target_as_str(target: Target) -> &'static str {
    match target {
        Target::Persona => "persona",
        Target::Runtime => "runtime",
        Target::PatternLog => "pattern_log",
    }
}

impl crate::cognition::FrequencyLookup for Storage {
    fn count_prior(&self, user_id: &str, category: &str, field: &str, value: &serde_json::Value) -> u32 {
        self.count_prior_signal(user_id, category, field, value).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "pattern log frequency lookup failed, defaulting to 0");
            0
        })
    }
}

impl crate::cognition::PatternLogger for Storage {
    fn log(&self, user_id: &str, signal: &Signal, decision: &Decision) {
        if let Err(err) = self.insert_pattern_log(user_id, signal, decision) {
            tracing::warn!(error = %err, "pattern log write failed");
        }
    }
}
