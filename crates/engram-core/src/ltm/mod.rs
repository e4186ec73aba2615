//! [C9/C11] Long-Term Memory Store: the writer (dedup/reinforce/insert +
//! episodic TTL) and episodic decay.

pub mod decay;
pub mod writer;

pub use writer::{write_facts, WriteReport, IMPORTANCE_INCREMENT, MAX_IMPORTANCE, SEMANTIC_DUP_DISTANCE};
