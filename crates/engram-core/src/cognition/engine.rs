//! The cognition engine (C7): converts signals into decisions using the
//! static per-field policy table. Grounded in
//! `original_source/MEMORY_SYSTEM/cognition/{cognition_updater,
//! reasoning_policy}.py`'s `run_cognition`/`decide`.

use crate::cognition::frequency::{enrich, FrequencyLookup};
use crate::cognition::policy::{Mode, PolicyTable};
use crate::cognition::signal::{Action, Decision, EpistemicRole, Signal, Target};

/// Per-user pattern log writer, invoked non-blockingly after each learnable
/// decision. Failures here must never fail cognition itself (spec section
/// 4.1 "Contract").
pub trait PatternLogger {
    fn log(&self, user_id: &str, signal: &Signal, decision: &Decision);
}

/// No-op logger for tests and for callers that don't need pattern-log
/// persistence.
pub struct NullLogger;
impl PatternLogger for NullLogger {
    fn log(&self, _user_id: &str, _signal: &Signal, _decision: &Decision) {}
}

/// Pure, table-driven cognition engine.
pub struct CognitionEngine {
    policy: PolicyTable,
}

impl Default for CognitionEngine {
    fn default() -> Self {
        Self {
            policy: crate::cognition::policy::default_table(),
        }
    }
}

impl CognitionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a custom policy table, e.g. one sourced from a structured-
    /// output configuration LLM (out of scope here).
    pub fn with_policy(policy: PolicyTable) -> Self {
        Self { policy }
    }

    /// Process one batch of signals for a user, enriching frequency via
    /// `lookup` and logging learnable decisions via `logger`. Guarantees
    /// (mirroring `run_cognition`): every signal yields exactly one
    /// decision; signals are never mutated (the caller's copy, a clone, is
    /// what gets frequency-enriched); persona signals never reach the
    /// learning path and are never pattern-logged; an internal failure
    /// degrades to `REJECT reasoning_error` rather than propagating.
    pub fn run(
        &self,
        user_id: &str,
        signals: &[Signal],
        lookup: &dyn FrequencyLookup,
        logger: &dyn PatternLogger,
    ) -> Vec<Decision> {
        signals
            .iter()
            .map(|signal| self.decide_one(user_id, signal, lookup, logger))
            .collect()
    }

    fn decide_one(
        &self,
        user_id: &str,
        signal: &Signal,
        lookup: &dyn FrequencyLookup,
        logger: &dyn PatternLogger,
    ) -> Decision {
        // Persona short-circuit (spec section 4.1 step 1): never enters the
        // learning path, never pattern-logged.
        if signal.epistemic_role == EpistemicRole::Persona {
            return Decision {
                action: Action::Commit,
                target: Some(Target::Persona),
                scope: vec![signal.field.clone()],
                confidence: 1.0,
                reason: "explicit persona declaration".to_string(),
            };
        }

        let decision = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut enriched = signal.clone();
            enrich(&mut enriched, user_id, lookup);
            self.decide(&enriched)
        }))
        .unwrap_or_else(|_| Decision::reject("reasoning_error"));

        logger.log(user_id, signal, &decision);
        decision
    }

    /// The pure policy resolution (spec section 4.1 steps 2-4).
    fn decide(&self, signal: &Signal) -> Decision {
        let policy = match self.policy.get(&signal.field) {
            Some(p) => p,
            None => {
                return Decision {
                    action: Action::Defer,
                    target: Some(Target::PatternLog),
                    scope: vec![signal.field.clone()],
                    confidence: signal.base_confidence,
                    reason: "unknown field".to_string(),
                };
            }
        };

        // Safety gate.
        if signal.base_confidence < policy.min_confidence {
            return Decision {
                action: Action::Reject,
                target: None,
                scope: Vec::new(),
                confidence: signal.base_confidence,
                reason: "below min_confidence".to_string(),
            };
        }

        let is_explicit = matches!(signal.source, crate::cognition::signal::SignalSource::Explicit);
        let frequency_met = signal.frequency >= policy.min_freq;

        let (action, target) = match policy.mode {
            Mode::Explicit => {
                if is_explicit {
                    (Action::Commit, Some(Target::Runtime))
                } else {
                    return Decision {
                        action: Action::Reject,
                        target: None,
                        scope: Vec::new(),
                        confidence: signal.base_confidence,
                        reason: "explicit mode requires explicit source".to_string(),
                    };
                }
            }
            Mode::ExplicitOrN => {
                if is_explicit {
                    (Action::Commit, Some(Target::Runtime))
                } else if frequency_met {
                    (Action::Commit, Some(Target::Runtime))
                } else {
                    (Action::ProvisionalCommit, Some(Target::Runtime))
                }
            }
            Mode::Implicit => {
                if frequency_met {
                    (Action::Commit, Some(Target::Runtime))
                } else {
                    (Action::ProvisionalCommit, Some(Target::Runtime))
                }
            }
            Mode::Hybrid => {
                if is_explicit || frequency_met {
                    (Action::Commit, Some(Target::Runtime))
                } else {
                    (Action::ProvisionalCommit, Some(Target::Runtime))
                }
            }
        };

        let target = if policy.persona_eligible {
            Some(Target::Persona)
        } else {
            target
        };

        Decision {
            action,
            target,
            scope: vec![signal.field.clone()],
            confidence: signal.base_confidence,
            reason: format!("{:?} mode resolution", policy.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognition::frequency::NoHistory;
    use crate::cognition::signal::SignalSource;

    #[test]
    fn persona_signal_always_commits_with_scope() {
        let engine = CognitionEngine::new();
        let signal = Signal::new(
            "objective",
            "tone",
            serde_json::json!("professional"),
            0.2,
            SignalSource::Explicit,
            EpistemicRole::Persona,
        );
        let decisions = engine.run("u1", &[signal], &NoHistory, &NullLogger);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].action, Action::Commit);
        assert_eq!(decisions[0].target, Some(Target::Persona));
        assert_eq!(decisions[0].scope, vec!["tone".to_string()]);
        assert!((decisions[0].confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn below_min_confidence_is_rejected() {
        let engine = CognitionEngine::new();
        let signal = Signal::new(
            "constraint",
            "constraint",
            serde_json::json!("no emojis"),
            0.5,
            SignalSource::Explicit,
            EpistemicRole::Learnable,
        );
        let decisions = engine.run("u1", &[signal], &NoHistory, &NullLogger);
        assert_eq!(decisions[0].action, Action::Reject);
    }

    #[test]
    fn explicit_mode_rejects_implicit_source() {
        let engine = CognitionEngine::new();
        let signal = Signal::new(
            "constraint",
            "constraint",
            serde_json::json!("no emojis"),
            0.99,
            SignalSource::Implicit,
            EpistemicRole::Learnable,
        );
        let decisions = engine.run("u1", &[signal], &NoHistory, &NullLogger);
        assert_eq!(decisions[0].action, Action::Reject);
    }

    #[test]
    fn unknown_field_defers_to_pattern_log() {
        let engine = CognitionEngine::new();
        let signal = Signal::new(
            "mystery",
            "mystery_field",
            serde_json::json!("value"),
            0.9,
            SignalSource::Explicit,
            EpistemicRole::Learnable,
        );
        let decisions = engine.run("u1", &[signal], &NoHistory, &NullLogger);
        assert_eq!(decisions[0].action, Action::Defer);
        assert_eq!(decisions[0].target, Some(Target::PatternLog));
    }

    struct FixedHistory(u32);
    impl FrequencyLookup for FixedHistory {
        fn count_prior(&self, _: &str, _: &str, _: &str, _: &serde_json::Value) -> u32 {
            self.0
        }
    }

    #[test]
    fn implicit_mode_commits_once_frequency_threshold_met() {
        let engine = CognitionEngine::new();
        let signal = Signal::new(
            "expertise",
            "expertise",
            serde_json::json!("rust"),
            0.9,
            SignalSource::Implicit,
            EpistemicRole::Learnable,
        );
        // min_freq for expertise is 3; 2 priors + 1 = 3.
        let decisions = engine.run("u1", &[signal.clone()], &FixedHistory(2), &NullLogger);
        assert_eq!(decisions[0].action, Action::Commit);

        let decisions = engine.run("u1", &[signal], &FixedHistory(0), &NullLogger);
        assert_eq!(decisions[0].action, Action::ProvisionalCommit);
    }
}
