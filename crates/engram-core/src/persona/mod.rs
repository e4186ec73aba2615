//! [C8] Persona Projection & Merge Engine (spec section 4.2) and the
//! persona data model (spec section 3).

pub mod merger;
pub mod projector;
pub mod schema;

pub use merger::{choose_block, merge_persona};
pub use projector::{project, ProjectedPersona};
pub use schema::{ExtractedPersona, PersonaBlock, StoredPersona, BLOCK_NAMES, CONFIDENCE_OVERRIDE_THRESHOLD};
