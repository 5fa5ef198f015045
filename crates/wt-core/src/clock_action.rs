//! Clock action enum as the single source of truth for start/stop strings.
//!
//! Terminals in the workshop emit free-form, partly localized event types
//! (`Start`, `ZAČETEK`, `konec`, ...). Parsing trims and lower-cases the raw
//! value before matching it against the synonym sets below.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw strings that open a work segment.
pub const START_SYNONYMS: &[&str] = &["start", "začetek", "zacitek"];

/// Raw strings that close a work segment.
pub const STOP_SYNONYMS: &[&str] = &["stop", "zaključi", "zaključek", "konec", "zakljuci"];

/// What a clock event does to the worker's open segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockAction {
    /// Clock in, or switch to a new task.
    Start,
    /// Clock out.
    Stop,
}

impl ClockAction {
    /// Canonical string form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for ClockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ClockAction {
    type Err = UnknownClockAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if START_SYNONYMS.contains(&normalized.as_str()) {
            Ok(Self::Start)
        } else if STOP_SYNONYMS.contains(&normalized.as_str()) {
            Ok(Self::Stop)
        } else {
            Err(UnknownClockAction(s.to_string()))
        }
    }
}

impl Serialize for ClockAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClockAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for event type strings outside both synonym sets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown clock action: {0}")]
pub struct UnknownClockAction(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_synonyms_parse() {
        for raw in START_SYNONYMS {
            assert_eq!(raw.parse::<ClockAction>(), Ok(ClockAction::Start), "{raw}");
        }
        for raw in STOP_SYNONYMS {
            assert_eq!(raw.parse::<ClockAction>(), Ok(ClockAction::Stop), "{raw}");
        }
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        assert_eq!("  START ".parse::<ClockAction>(), Ok(ClockAction::Start));
        assert_eq!("ZAČETEK".parse::<ClockAction>(), Ok(ClockAction::Start));
        assert_eq!("Zaključek\n".parse::<ClockAction>(), Ok(ClockAction::Stop));
    }

    #[test]
    fn unknown_action_errors() {
        let err = "pause".parse::<ClockAction>().unwrap_err();
        assert_eq!(err.to_string(), "unknown clock action: pause");
    }

    #[test]
    fn display_roundtrips() {
        for action in [ClockAction::Start, ClockAction::Stop] {
            assert_eq!(action.to_string().parse::<ClockAction>(), Ok(action));
        }
    }
}
