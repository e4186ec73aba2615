//! Artifact creation rule (spec section 4.7's "Artifact creation rule").
//! Grounded on `original_source/MEMORY_SYSTEM/stm/stm_orchestrator.py`'s
//! `should_create_artifact`/`post_model_response`.

use crate::extraction::Route;

/// Fixed predicate: a response on the `current_context` route longer than
/// this many trimmed characters is materialized as an artifact.
pub const ARTIFACT_MIN_RESPONSE_LEN: usize = 200;

pub fn should_create_artifact(route: Route, response: &str) -> bool {
    route == Route::CurrentContext && response.trim().chars().count() > ARTIFACT_MIN_RESPONSE_LEN
}

/// A short human-facing summary for the artifact's metadata row. Takes the
/// first line, falling back to a char-truncated prefix for single-line
/// responses.
pub fn summarize(response: &str) -> String {
    const SUMMARY_MAX_CHARS: usize = 120;
    let first_line = response.trim().lines().next().unwrap_or_default();
    crate::memory::truncate_chars(first_line, SUMMARY_MAX_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_current_context_response_is_not_materialized() {
        assert!(!should_create_artifact(Route::CurrentContext, "too short"));
    }

    #[test]
    fn long_current_context_response_is_materialized() {
        let response = "x".repeat(ARTIFACT_MIN_RESPONSE_LEN + 1);
        assert!(should_create_artifact(Route::CurrentContext, &response));
    }

    #[test]
    fn non_current_context_route_never_materializes() {
        let response = "x".repeat(ARTIFACT_MIN_RESPONSE_LEN + 1);
        assert!(!should_create_artifact(Route::Edit, &response));
    }

    #[test]
    fn summary_takes_first_line() {
        let summary = summarize("Subject: Q3 roadmap\n\nHi team, ...");
        assert_eq!(summary, "Subject: Q3 roadmap");
    }
}
