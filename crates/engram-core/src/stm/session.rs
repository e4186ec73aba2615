//! Session scratchpad (spec section 3): per-session, TTL'd, in-memory —
//! "out-of-core if not needed by a minimal implementation", kept here since
//! the orchestrator's artifact lifecycle (spec section 4.7 step 8) appends
//! events to it. Grounded in
//! `original_source/MEMORY_SYSTEM/stm/stm_orchestrator.py`'s in-process
//! session state.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::extraction::Route;

pub const MESSAGE_CAP: usize = 50;
pub const EVENT_CAP: usize = 100;

/// Default scratchpad lifetime before it's eligible for eviction by the
/// holder (e.g. an LRU/time-wheel cache the orchestrator keeps — the
/// scratchpad itself is just the TTL'd record, not the cache).
pub const DEFAULT_TTL: Duration = Duration::hours(6);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchMessage {
    pub role: String,
    pub content: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScratchEvent {
    pub kind: String,
    pub detail: String,
    pub at: DateTime<Utc>,
}

/// Per-session state: ordered message stream (cap 50), event stream (cap
/// 100), goal set, and routing metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScratchpad {
    pub session_id: String,
    pub messages: VecDeque<ScratchMessage>,
    pub events: VecDeque<ScratchEvent>,
    pub goals: Vec<String>,
    pub current_route: Option<Route>,
    pub route_confidence: f64,
    pub expires_at: DateTime<Utc>,
}

impl SessionScratchpad {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: VecDeque::new(),
            events: VecDeque::new(),
            goals: Vec::new(),
            current_route: None,
            route_confidence: 0.0,
            expires_at: Utc::now() + DEFAULT_TTL,
        }
    }

    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        self.expires_at < at
    }

    /// Push a message, evicting the oldest once the cap is exceeded.
    pub fn push_message(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.messages.push_back(ScratchMessage {
            role: role.into(),
            content: content.into(),
            at: Utc::now(),
        });
        while self.messages.len() > MESSAGE_CAP {
            self.messages.pop_front();
        }
    }

    /// Push an event (e.g. an artifact-written notice), evicting the oldest
    /// once the cap is exceeded.
    pub fn push_event(&mut self, kind: impl Into<String>, detail: impl Into<String>) {
        self.events.push_back(ScratchEvent {
            kind: kind.into(),
            detail: detail.into(),
            at: Utc::now(),
        });
        while self.events.len() > EVENT_CAP {
            self.events.pop_front();
        }
    }

    pub fn set_route(&mut self, route: Route, confidence: f64) {
        self.current_route = Some(route);
        self.route_confidence = confidence;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_stream_respects_cap() {
        let mut pad = SessionScratchpad::new("s1");
        for i in 0..(MESSAGE_CAP + 10) {
            pad.push_message("user", format!("msg {i}"));
        }
        assert_eq!(pad.messages.len(), MESSAGE_CAP);
        assert_eq!(pad.messages.front().unwrap().content, "msg 10");
    }

    #[test]
    fn event_stream_respects_cap() {
        let mut pad = SessionScratchpad::new("s1");
        for i in 0..(EVENT_CAP + 5) {
            pad.push_event("artifact_written", format!("ref {i}"));
        }
        assert_eq!(pad.events.len(), EVENT_CAP);
    }
}
