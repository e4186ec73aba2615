//! [C11] Episodic Decay — deletes expired episodic rows. Grounded in
//! `original_source/MEMORY_SYSTEM/ltm/decay_episodic_ltm.py`'s
//! `decay_episodic_ltm`.

use chrono::{DateTime, Utc};

use crate::storage::{Storage, StorageError};

/// Delete every episodic memory row (for any user) whose `expires_at` has
/// passed as of `at`. Idempotent: a re-run after the rows are gone is a
/// no-op DELETE, so it's safe to run concurrently with extraction (spec
/// section 4.5).
pub fn run(storage: &Storage, at: DateTime<Utc>) -> Result<u64, StorageError> {
    storage.delete_expired_episodic(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ConfidenceSource, Memory, MemoryKind, MemoryStatus};

    fn episodic_expiring_at(expires_at: DateTime<Utc>) -> Memory {
        let now = Utc::now();
        Memory {
            memory_id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            memory_kind: MemoryKind::Episodic,
            category: "active_file".to_string(),
            topic: "active_file".to_string(),
            fact: "active_file: main.rs".to_string(),
            importance: 1.0,
            confidence_score: 0.9,
            confidence_source: ConfidenceSource::Implicit,
            frequency: 1,
            evidence_count: 1,
            status: MemoryStatus::Active,
            embedding: None,
            metadata: serde_json::json!({}),
            expires_at: Some(expires_at),
            created_at: now,
            last_updated: now,
            last_accessed: None,
        }
    }

    #[test]
    fn deletes_only_expired_rows() {
        let storage = Storage::open_in_memory().expect("open");
        let now = Utc::now();
        storage.insert_memory(&episodic_expiring_at(now - chrono::Duration::hours(1))).expect("insert expired");
        storage.insert_memory(&episodic_expiring_at(now + chrono::Duration::hours(1))).expect("insert live");

        let deleted = run(&storage, now).expect("decay");
        assert_eq!(deleted, 1);

        let remaining = storage.list_active_episodic("u1").expect("list");
        assert_eq!(remaining.len(), 1);
    }

    #[test]
    fn rerunning_after_deletion_is_a_noop() {
        let storage = Storage::open_in_memory().expect("open");
        let now = Utc::now();
        storage.insert_memory(&episodic_expiring_at(now - chrono::Duration::hours(1))).expect("insert expired");

        assert_eq!(run(&storage, now).expect("first run"), 1);
        assert_eq!(run(&storage, now).expect("second run"), 0);
    }
}
