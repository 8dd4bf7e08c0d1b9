//! In-memory stop directory.
//!
//! Serves fixed stops, lines and departures, and counts the calls made
//! against it. Used to exercise the resolver without network access.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::{Departure, LineAtStop, LineKey, Provider, StopCandidate, StopId};
use crate::normalize::normalize;

use super::StopDirectory;

/// Number of calls made per directory operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub search: usize,
    pub lines: usize,
    pub realtime: usize,
    pub scheduled: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.search + self.lines + self.realtime + self.scheduled
    }
}

/// A directory backed by in-memory tables.
#[derive(Debug)]
pub struct InMemoryDirectory {
    provider: Provider,
    stops: Vec<StopCandidate>,
    lines: HashMap<StopId, Vec<LineAtStop>>,
    realtime: HashMap<StopId, Vec<Departure>>,
    scheduled: HashMap<StopId, Vec<Departure>>,
    relaxed_scope: bool,
    calls: Mutex<CallCounts>,
}

impl InMemoryDirectory {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            stops: Vec::new(),
            lines: HashMap::new(),
            realtime: HashMap::new(),
            scheduled: HashMap::new(),
            relaxed_scope: false,
            calls: Mutex::new(CallCounts::default()),
        }
    }

    /// Add a stop. Search returns stops in insertion order.
    pub fn with_stop(mut self, id: StopId, name: impl Into<String>) -> Self {
        self.stops
            .push(StopCandidate::new(self.provider, id, name));
        self
    }

    pub fn with_lines(mut self, id: StopId, lines: Vec<LineAtStop>) -> Self {
        self.lines.insert(id, lines);
        self
    }

    pub fn with_realtime(mut self, id: StopId, departures: Vec<Departure>) -> Self {
        self.realtime.insert(id, departures);
        self
    }

    pub fn with_schedule(mut self, id: StopId, departures: Vec<Departure>) -> Self {
        self.scheduled.insert(id, departures);
        self
    }

    /// Also index lines under the stop's own scope, as the regional bus
    /// client does.
    pub fn with_relaxed_scope(mut self) -> Self {
        self.relaxed_scope = true;
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> CallCounts {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, bump: impl FnOnce(&mut CallCounts)) {
        bump(&mut self.calls.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

impl StopDirectory for InMemoryDirectory {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn search_stops(&self, name: &str, max_results: usize) -> Vec<StopCandidate> {
        self.record(|c| c.search += 1);
        let query = normalize(name);
        if query.is_empty() {
            return Vec::new();
        }
        self.stops
            .iter()
            .filter(|stop| normalize(&stop.name).contains(&query))
            .take(max_results)
            .cloned()
            .collect()
    }

    async fn lines_at(&self, stop: &StopCandidate) -> Vec<LineAtStop> {
        self.record(|c| c.lines += 1);
        self.lines.get(&stop.id).cloned().unwrap_or_default()
    }

    async fn realtime_departures(&self, stop: &StopCandidate) -> Vec<Departure> {
        self.record(|c| c.realtime += 1);
        self.realtime.get(&stop.id).cloned().unwrap_or_default()
    }

    async fn scheduled_departures(&self, stop: &StopCandidate) -> Vec<Departure> {
        self.record(|c| c.scheduled += 1);
        self.scheduled.get(&stop.id).cloned().unwrap_or_default()
    }

    fn line_keys(&self, stop: &StopCandidate, line: &LineAtStop) -> Vec<LineKey> {
        let mut keys = vec![line.key()];
        if self.relaxed_scope
            && let Some(scope) = stop.id.scope()
        {
            let relaxed = LineKey::scoped(scope, &line.line);
            if !keys.contains(&relaxed) {
                keys.push(relaxed);
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new(Provider::RegionalBus)
            .with_stop(StopId::scoped("3", "1"), "Leuven Station perron 1")
            .with_stop(StopId::scoped("3", "2"), "Leuven Station perron 2")
            .with_stop(StopId::scoped("3", "3"), "Aarschot Station")
    }

    #[tokio::test]
    async fn search_is_accent_and_case_insensitive() {
        let dir = directory();
        let stops = dir.search_stops("LEUVEN station", 30).await;
        assert_eq!(stops.len(), 2);
        assert_eq!(dir.search_stops("aarschot", 30).await.len(), 1);
        assert!(dir.search_stops("", 30).await.is_empty());
        assert_eq!(dir.calls().search, 3);
    }

    #[tokio::test]
    async fn search_respects_cap() {
        let stops = directory().search_stops("station", 1).await;
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].name, "Leuven Station perron 1");
    }

    #[tokio::test]
    async fn departures_fall_back_to_schedule() {
        let id = StopId::scoped("3", "3");
        let dir = directory().with_schedule(id.clone(), vec![Departure::new("35", "Leuven")]);
        let stop = StopCandidate::new(Provider::RegionalBus, id, "Aarschot Station");

        let departures = dir.departures_at(&stop).await;
        assert_eq!(departures.len(), 1);
        assert_eq!(
            dir.calls(),
            CallCounts {
                realtime: 1,
                scheduled: 1,
                ..CallCounts::default()
            }
        );
    }

    #[tokio::test]
    async fn realtime_skips_schedule() {
        let id = StopId::scoped("3", "3");
        let dir = directory()
            .with_realtime(id.clone(), vec![Departure::new("35", "Leuven")])
            .with_schedule(id.clone(), vec![Departure::new("36", "Leuven")]);
        let stop = StopCandidate::new(Provider::RegionalBus, id, "Aarschot Station");

        let departures = dir.departures_at(&stop).await;
        assert_eq!(departures[0].line, "35");
        assert_eq!(dir.calls().scheduled, 0);
    }
}
