//! Stop directories: searchable databases of stops, the lines serving them,
//! and their upcoming departures.
//!
//! Each provider has its own id scheme and quirks. The [`StopDirectory`]
//! trait hides them behind one surface so the route resolver stays
//! provider-agnostic:
//!
//! - every call is time-bounded by the client's HTTP timeout
//! - a failed call is logged and reported as "no data"
//! - departures prefer realtime and fall back to the static schedule

mod city;
mod error;
mod memory;
mod regional;
mod wire;

pub use city::{CityTransitClient, CityTransitConfig};
pub use error::DirectoryError;
pub use memory::{CallCounts, InMemoryDirectory};
pub use regional::{RegionalBusClient, RegionalBusConfig};

use tracing::{debug, info, warn};

use crate::domain::{Departure, LineAtStop, LineKey, Provider, StopCandidate};

/// A provider-normalized stop directory.
///
/// Implementations swallow their own failures (logging them) and return
/// empty results, so callers can treat every response as partial data.
#[allow(async_fn_in_trait)]
pub trait StopDirectory {
    /// Which provider this directory queries.
    fn provider(&self) -> Provider;

    /// Stops whose name matches `name`, at most `max_results`.
    async fn search_stops(&self, name: &str, max_results: usize) -> Vec<StopCandidate>;

    /// Lines the provider lists as serving `stop`.
    async fn lines_at(&self, stop: &StopCandidate) -> Vec<LineAtStop>;

    /// Realtime departures at `stop`.
    async fn realtime_departures(&self, stop: &StopCandidate) -> Vec<Departure>;

    /// Timetabled departures at `stop`. Providers without a schedule source
    /// report none.
    async fn scheduled_departures(&self, _stop: &StopCandidate) -> Vec<Departure> {
        Vec::new()
    }

    /// Index keys under which `line` at `stop` is recorded and looked up.
    ///
    /// Providers that report a line's scope inconsistently add relaxed
    /// variants here.
    fn line_keys(&self, _stop: &StopCandidate, line: &LineAtStop) -> Vec<LineKey> {
        vec![line.key()]
    }

    /// Departures at `stop`: realtime, or the schedule when realtime has
    /// nothing.
    async fn departures_at(&self, stop: &StopCandidate) -> Vec<Departure> {
        let realtime = self.realtime_departures(stop).await;
        if !realtime.is_empty() {
            debug!(stop = %stop.name, count = realtime.len(), "Realtime departures");
            return realtime;
        }

        info!(stop = %stop.name, "Realtime empty, falling back to schedule");
        let scheduled = self.scheduled_departures(stop).await;
        info!(stop = %stop.name, count = scheduled.len(), "Scheduled departures");
        scheduled
    }
}

/// Log a failed directory call and degrade it to no data.
fn or_empty<T>(result: Result<Vec<T>, DirectoryError>, provider: Provider, call: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(%provider, call, error = %e, "Directory call failed");
        Vec::new()
    })
}
