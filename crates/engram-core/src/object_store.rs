//! Object store client (external collaborator, spec section 1: contract
//! `write(type, id, body) -> content_ref`). Grounded in
//! `original_source/MEMORY_SYSTEM/artifacts/{artifact_repository,
//! s3_client}.py`. `LocalObjectStore` is filesystem-backed since no
//! object-store SDK appears anywhere in the example pack and spec.md treats
//! this as an external contract, not a concern to vendor a specific SDK for.

use std::path::PathBuf;

use async_trait::async_trait;

#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum ObjectStoreError {
    #[error("object store io error: {0}")]
    Io(String),
}

/// Writes artifact bodies and returns an opaque content reference, per spec
/// section 6's object store layout: `artifacts/{artifact_type}/{artifact_id}.md`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn write(
        &self,
        artifact_type: &str,
        artifact_id: &str,
        body: &str,
    ) -> Result<String, ObjectStoreError>;
}

/// Filesystem-backed object store rooted at a configured directory.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn content_ref(artifact_type: &str, artifact_id: &str) -> String {
        format!("artifacts/{artifact_type}/{artifact_id}.md")
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn write(
        &self,
        artifact_type: &str,
        artifact_id: &str,
        body: &str,
    ) -> Result<String, ObjectStoreError> {
        let content_ref = Self::content_ref(artifact_type, artifact_id);
        let path = self.root.join(&content_ref);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ObjectStoreError::Io(e.to_string()))?;
        }
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| ObjectStoreError::Io(e.to_string()))?;
        Ok(content_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_under_typed_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf());
        let content_ref = store.write("email", "abc123", "hello world").await.unwrap();
        assert_eq!(content_ref, "artifacts/email/abc123.md");
        let written = tokio::fs::read_to_string(dir.path().join(&content_ref))
            .await
            .unwrap();
        assert_eq!(written, "hello world");
    }
}
