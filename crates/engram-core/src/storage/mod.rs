//! [C3/C4/C5/C6] Storage layer: the relational store (with an in-process
//! vector scan standing in for the external vector-indexed store) behind
//! memories, persona, STM, pattern log, and artifact metadata.

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{ArtifactRow, PatternLogRow, Storage, StorageError};
