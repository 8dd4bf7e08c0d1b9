//! Lines serving a stop and departures from it.

use std::fmt;

use chrono::NaiveDateTime;

use super::time::{delay_suffix, hhmm};

/// A line identifier, optionally scoped to an operator or region.
///
/// Used as the key of the destination-side line index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub scope: Option<String>,
    pub line: String,
}

impl LineKey {
    /// Create a scoped key.
    pub fn scoped(scope: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            line: line.into(),
        }
    }

    /// Create a key with no scope.
    pub fn unscoped(line: impl Into<String>) -> Self {
        Self {
            scope: None,
            line: line.into(),
        }
    }
}

/// A line reported as serving a stop.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineAtStop {
    /// Scope the provider reported for the line (may differ from the stop's).
    pub scope: Option<String>,
    pub line: String,
}

impl LineAtStop {
    pub fn new(scope: Option<String>, line: impl Into<String>) -> Self {
        Self {
            scope,
            line: line.into(),
        }
    }

    /// The key exactly as reported.
    pub fn key(&self) -> LineKey {
        LineKey {
            scope: self.scope.clone(),
            line: self.line.clone(),
        }
    }
}

/// A single scheduled or realtime passage of a line at a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub line: String,
    pub destination: String,
    pub scheduled: Option<NaiveDateTime>,
    pub realtime: Option<NaiveDateTime>,
    pub platform: Option<String>,
}

impl Departure {
    /// Create a departure with no times.
    pub fn new(line: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            destination: destination.into(),
            scheduled: None,
            realtime: None,
            platform: None,
        }
    }

    pub fn with_scheduled(mut self, t: NaiveDateTime) -> Self {
        self.scheduled = Some(t);
        self
    }

    pub fn with_realtime(mut self, t: NaiveDateTime) -> Self {
        self.realtime = Some(t);
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Realtime prediction if available, otherwise the scheduled time.
    pub fn effective_time(&self) -> Option<NaiveDateTime> {
        self.realtime.or(self.scheduled)
    }

    /// Realtime minus scheduled, in whole minutes (negative when early).
    ///
    /// Zero when either time is missing.
    pub fn delay_minutes(&self) -> i64 {
        match (self.scheduled, self.realtime) {
            (Some(scheduled), Some(realtime)) => {
                (realtime - scheduled).num_seconds().div_euclid(60)
            }
            _ => 0,
        }
    }
}

/// Board rendering: `HH:MM[ ±N'] lijn L -> Destination`.
impl fmt::Display for Departure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.effective_time() {
            Some(t) => write!(f, "{}{}", hhmm(t), delay_suffix(self.delay_minutes()))?,
            None => f.write_str("??:??")?,
        }
        write!(f, " lijn {} -> {}", self.line, self.destination)
    }
}
