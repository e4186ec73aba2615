//! Database migrations. Grounded in
//! `vestige-core/src/storage/migrations.rs`'s `Migration` struct + versioned
//! `MIGRATIONS` slice + `apply_migrations`/`get_current_version` pair; the
//! logical schema itself follows spec section 6.

/// A database migration.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: memories, memory_events, user_persona, stm_entries, pattern_logs, artifacts",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "FTS5 index over memories.fact for keyword-assisted retrieval",
        up: MIGRATION_V2_UP,
    },
];

const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));

CREATE TABLE IF NOT EXISTS memories (
    memory_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    memory_kind TEXT NOT NULL,
    category TEXT NOT NULL,
    topic TEXT NOT NULL,
    fact TEXT NOT NULL,
    importance REAL NOT NULL DEFAULT 1.0,
    confidence_score REAL NOT NULL,
    confidence_source TEXT NOT NULL,
    frequency INTEGER NOT NULL DEFAULT 1,
    evidence_count INTEGER NOT NULL DEFAULT 1,
    status TEXT NOT NULL DEFAULT 'active',
    embedding BLOB,
    metadata TEXT NOT NULL DEFAULT '{}',
    expires_at TEXT,
    created_at TEXT NOT NULL,
    last_updated TEXT NOT NULL,
    last_accessed TEXT
);
CREATE INDEX IF NOT EXISTS idx_memories_user_kind ON memories(user_id, memory_kind);
CREATE INDEX IF NOT EXISTS idx_memories_episodic_expiry ON memories(expires_at) WHERE memory_kind = 'episodic';
CREATE INDEX IF NOT EXISTS idx_memories_factual_confidence ON memories(confidence_score DESC) WHERE memory_kind = 'factual';
CREATE INDEX IF NOT EXISTS idx_memories_user_category_topic ON memories(user_id, category, topic) WHERE status = 'active';

CREATE TABLE IF NOT EXISTS memory_events (
    event_id TEXT PRIMARY KEY,
    memory_id TEXT NOT NULL REFERENCES memories(memory_id) ON DELETE CASCADE,
    event_type TEXT NOT NULL,
    source TEXT NOT NULL,
    signal_strength REAL NOT NULL,
    raw_context TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_memory_events_memory ON memory_events(memory_id);
CREATE INDEX IF NOT EXISTS idx_memory_events_type ON memory_events(event_type);

CREATE TABLE IF NOT EXISTS user_persona (
    user_id TEXT PRIMARY KEY,
    user_identity TEXT,
    company_profile TEXT,
    company_business TEXT,
    company_products TEXT,
    company_brand TEXT,
    objective TEXT,
    content_format TEXT,
    audience TEXT,
    tone TEXT,
    writing_style TEXT,
    language TEXT,
    constraints TEXT,
    last_updated TEXT
);

CREATE TABLE IF NOT EXISTS stm_entries (
    stm_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    state_type TEXT NOT NULL,
    statement TEXT NOT NULL,
    rationale TEXT,
    applies_to TEXT,
    supersedes TEXT REFERENCES stm_entries(stm_id) DEFERRABLE INITIALLY DEFERRED,
    confidence REAL NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_stm_user_active ON stm_entries(user_id, is_active, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_stm_supersedes ON stm_entries(supersedes);

CREATE TABLE IF NOT EXISTS pattern_logs (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    signal_category TEXT NOT NULL,
    signal_field TEXT NOT NULL,
    signal_value TEXT NOT NULL,
    action TEXT NOT NULL,
    target TEXT,
    confidence REAL NOT NULL,
    reason TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_pattern_logs_lookup ON pattern_logs(user_id, signal_category, signal_field, signal_value);

CREATE TABLE IF NOT EXISTS artifacts (
    artifact_id TEXT PRIMARY KEY,
    artifact_type TEXT NOT NULL DEFAULT 'email',
    summary TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    content_ref TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_updated_at TEXT NOT NULL
);
"#;

const MIGRATION_V2_UP: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
    fact,
    topic,
    content='memories',
    content_rowid='rowid'
);

CREATE TRIGGER IF NOT EXISTS memories_fts_insert AFTER INSERT ON memories BEGIN
    INSERT INTO memories_fts(rowid, fact, topic) VALUES (new.rowid, new.fact, new.topic);
END;
CREATE TRIGGER IF NOT EXISTS memories_fts_delete AFTER DELETE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, fact, topic) VALUES ('delete', old.rowid, old.fact, old.topic);
END;
CREATE TRIGGER IF NOT EXISTS memories_fts_update AFTER UPDATE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, fact, topic) VALUES ('delete', old.rowid, old.fact, old.topic);
    INSERT INTO memories_fts(rowid, fact, topic) VALUES (new.rowid, new.fact, new.topic);
END;

UPDATE schema_version SET version = 2, applied_at = datetime('now');
INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (2, datetime('now'));
"#;

pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
        row.get(0)
    })
    .or(Ok(0))
}

pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                version = migration.version,
                description = migration.description,
                "applying migration"
            );
            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
