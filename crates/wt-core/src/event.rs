//! Raw clock events as delivered by the time-clock terminals.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::clock_action::ClockAction;

/// One clock action by one worker.
///
/// Events are taken as-is from the event source: the event type is an
/// unparsed string and the task reference may be missing. Validation happens
/// in the normalizer, which drops what it cannot use instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockEvent {
    /// Stable worker identifier.
    pub worker_id: String,
    /// Display name. Never used as a key.
    #[serde(default)]
    pub worker_name: String,
    /// Local wall-clock time of the action.
    pub timestamp: NaiveDateTime,
    /// Free-form event type, matched against the start/stop synonyms.
    pub event_type: String,
    /// Task the worker is clocking onto, if any.
    #[serde(default)]
    pub task_ref: Option<String>,
}

impl ClockEvent {
    /// Parses the event type, returning `None` for inert values.
    pub fn action(&self) -> Option<ClockAction> {
        self.event_type.parse().ok()
    }

    /// Returns the task reference when it is present and non-empty.
    pub fn task_ref(&self) -> Option<&str> {
        self.task_ref.as_deref().filter(|task| !task.is_empty())
    }
}
