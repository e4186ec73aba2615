//! [C10] Consolidator: level-1 duplicate merging and level-2 topic
//! canonicalization over active factual memories.

pub mod level1;
pub mod level2;

pub use level1::{consolidate, ConsolidationResult, MergeDetail, L1_SIMILARITY_THRESHOLD};
pub use level2::{canonicalize, CanonicalizationDetail, CanonicalizationResult};
