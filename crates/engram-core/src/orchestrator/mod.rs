//! [C14/C15] Orchestrator: per-turn glue plus the background job queue
//! (spec section 4.7), and the artifact-creation rule (spec section 4.7's
//! "Artifact creation rule").

pub mod artifacts;
pub mod background;
pub mod turn;

pub use artifacts::{should_create_artifact, ARTIFACT_MIN_RESPONSE_LEN};
pub use turn::{Orchestrator, OrchestratorError, TurnReply};
