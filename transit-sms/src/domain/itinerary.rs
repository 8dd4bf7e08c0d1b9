//! Formatted itinerary rows.

use std::fmt;

use chrono::NaiveDateTime;

use super::departure::Departure;
use super::time::{delay_suffix, hhmm, truncate_to_minute};

/// One output row of a route answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryLine {
    /// Effective departure time (realtime if known, else scheduled).
    pub time: NaiveDateTime,
    pub delay_minutes: i64,
    pub origin: String,
    pub line: String,
    pub destination: String,
    pub origin_platform: Option<String>,
    pub destination_platform: Option<String>,
}

impl ItineraryLine {
    /// Build a row from a departure at `origin` heading for `destination`.
    ///
    /// Returns `None` for departures without any usable time.
    pub fn from_departure(departure: &Departure, origin: &str, destination: &str) -> Option<Self> {
        let time = departure.effective_time()?;
        Some(Self {
            time,
            delay_minutes: departure.delay_minutes(),
            origin: origin.to_string(),
            line: departure.line.clone(),
            destination: destination.to_string(),
            origin_platform: departure.platform.clone(),
            destination_platform: None,
        })
    }

    /// Identity of the physical run: effective time to the minute plus line.
    pub fn dedup_key(&self) -> (NaiveDateTime, String) {
        (truncate_to_minute(self.time), self.line.clone())
    }
}

impl fmt::Display for ItineraryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {}",
            hhmm(self.time),
            delay_suffix(self.delay_minutes),
            self.origin
        )?;
        if let Some(p) = &self.origin_platform {
            write!(f, " per.{p}")?;
        }
        write!(f, " lijn {} -> {}", self.line, self.destination)?;
        if let Some(p) = &self.destination_platform {
            write!(f, " per.{p}")?;
        }
        Ok(())
    }
}
