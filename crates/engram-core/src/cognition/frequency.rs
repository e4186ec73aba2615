//! Frequency enrichment (spec section 4.1): "how many times this SAME
//! signal (category + field + value) has appeared before for this user",
//! plus 1 for the current occurrence. Grounded in
//! `original_source/MEMORY_SYSTEM/cognition/signal_frequency.py`'s
//! `enrich_signal_frequency`, generalized from an `asyncpg` pool lookup to a
//! trait so the cognition engine stays pure aside from this one lookup.

use crate::cognition::Signal;

/// Counts prior pattern-log rows matching `(user_id, category, field,
/// value)`. Implemented by [`crate::storage::Storage`]; the cognition
/// engine's only I/O.
pub trait FrequencyLookup {
    fn count_prior(&self, user_id: &str, category: &str, field: &str, value: &serde_json::Value) -> u32;
}

/// No-op lookup that always reports zero priors — frequency becomes 1 for
/// every signal. Useful for unit-testing the policy resolution in
/// isolation from storage.
pub struct NoHistory;

impl FrequencyLookup for NoHistory {
    fn count_prior(&self, _user_id: &str, _category: &str, _field: &str, _value: &serde_json::Value) -> u32 {
        0
    }
}

/// Enrich a signal's `frequency` field in place using `lookup`.
pub fn enrich(signal: &mut Signal, user_id: &str, lookup: &dyn FrequencyLookup) {
    let prior = lookup.count_prior(user_id, &signal.category, &signal.field, &signal.value);
    signal.frequency = prior + 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cognition::{EpistemicRole, SignalSource};

    #[test]
    fn no_history_yields_frequency_one() {
        let mut signal = Signal::new(
            "user_preference",
            "tone",
            serde_json::json!("formal"),
            0.9,
            SignalSource::Explicit,
            EpistemicRole::Learnable,
        );
        enrich(&mut signal, "u1", &NoHistory);
        assert_eq!(signal.frequency, 1);
    }
}
