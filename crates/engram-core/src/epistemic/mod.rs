//! [Epistemic rules] A versioned, priority-ordered set of invariant,
//! principle, and heuristic rules, cross-cutting every other subsystem
//! (spec section 4.8).

pub mod engine;
pub mod prompt;
pub mod rules;
pub mod types;

pub use engine::{EnforcementContext, EpistemicEngine, EpistemicViolation};
pub use prompt::build_prompt_block;
pub use rules::default_rules;
pub use types::{EpistemicRule, RuleCategory, RuleScope};
