//! Rail connections and their reply rendering.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{delay_suffix, hhmm};
use crate::enrich::{Platforms, TimedPlatforms};

/// A scheduled call at a station, with its reported delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailEvent {
    pub station: String,
    /// Scheduled time
    pub time: DateTime<Utc>,
    pub delay_secs: i64,
    pub platform: Option<String>,
}

impl RailEvent {
    /// `HH:MM[ +N']` in `tz`. The time shown is the scheduled one.
    fn clock<Tz: TimeZone>(&self, tz: &Tz) -> String {
        let local = self.time.with_timezone(tz).naive_local();
        format!("{}{}", hhmm(local), delay_suffix(self.delay_secs.max(0) / 60))
    }

    fn platform_suffix(&self) -> String {
        self.platform
            .as_deref()
            .map(|p| format!(" per.{p}"))
            .unwrap_or_default()
    }
}

/// A transfer: arrival and onward departure at the same station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailVia {
    pub arrival: RailEvent,
    pub departure: RailEvent,
}

/// One journey option between two stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailConnection {
    pub departure: RailEvent,
    pub arrival: RailEvent,
    pub vias: Vec<RailVia>,
}

impl RailConnection {
    /// Render as one reply row with clock times in `tz`.
    ///
    /// `13:30 Gent-Sint-Pieters per.4 -> 14:05 Brussel-Centraal per.2`, with
    /// each transfer inserted as `-> 13:50 Brussel-Zuid per.12 | per.3 14:00`.
    pub fn render<Tz: TimeZone>(&self, tz: &Tz) -> String {
        let dep = &self.departure;
        let mut parts = vec![format!(
            "{} {}{}",
            dep.clock(tz),
            dep.station,
            dep.platform_suffix()
        )];

        for via in &self.vias {
            parts.push(format!(
                "-> {} {}{} |{} {}",
                via.arrival.clock(tz),
                via.arrival.station,
                via.arrival.platform_suffix(),
                via.departure.platform_suffix(),
                via.departure.clock(tz)
            ));
        }

        let arr = &self.arrival;
        parts.push(format!(
            "-> {} {}{}",
            arr.clock(tz),
            arr.station,
            arr.platform_suffix()
        ));
        parts.join(" ")
    }

    /// The connection as a platform candidate for enrichment.
    pub fn timed_platforms(&self) -> TimedPlatforms {
        TimedPlatforms {
            departure_time: self.departure.time,
            platforms: Platforms {
                departure: self.departure.platform.clone(),
                arrival: self.arrival.platform.clone(),
            },
        }
    }
}
