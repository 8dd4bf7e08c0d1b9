//! Two-pass direct-line resolution between two stop names.
//!
//! Both names expand to sets of stop candidates. The lines serving the
//! destination candidates form an index; origin candidates are matched
//! against it in two passes:
//!
//! - **Pass 1** asks the directory which lines serve each origin and looks
//!   them up by scoped key.
//! - **Pass 2** scans the departures of every origin Pass 1 did not match
//!   and accepts any line id that serves the destination in any scope. The
//!   line directory is incomplete for some stops (diversions, provider gaps);
//!   this recovers them.
//!
//! Departures on matched lines at or after the reference time are then
//! ranked into the reply.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use futures::future::{join, join_all};
use tracing::{debug, info};

use crate::directory::StopDirectory;
use crate::domain::{Departure, ItineraryLine, LineKey, StopCandidate, hhmm};

use super::config::ResolverConfig;
use super::index::DestinationIndex;
use super::rank::rank_rows;

/// The answer to a route query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// No stop matches the origin name.
    OriginNotFound { name: String },

    /// No stop matches the destination name.
    DestinationNotFound { name: String },

    /// Upcoming departures, earliest first.
    Routes(Vec<ItineraryLine>),

    /// A direct line exists but nothing departs at or after `after`.
    NothingAfter {
        origin: String,
        destination: String,
        line: String,
        after: NaiveDateTime,
    },

    /// No direct line. `board` holds the first origin stop with any
    /// departures, and a few of them.
    NoDirectLine {
        from: String,
        to: String,
        board: Option<(String, Vec<Departure>)>,
    },
}

impl RouteOutcome {
    /// Whether the query was answered.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RouteOutcome::Routes(_) | RouteOutcome::NothingAfter { .. }
        )
    }
}

impl fmt::Display for RouteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteOutcome::OriginNotFound { name } | RouteOutcome::DestinationNotFound { name } => {
                write!(f, "Geen halte gevonden voor '{name}'.")
            }
            RouteOutcome::Routes(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    write!(f, "{row}")?;
                }
                Ok(())
            }
            RouteOutcome::NothingAfter {
                origin,
                destination,
                line,
                after,
            } => write!(
                f,
                "{origin} -> {destination}\nLijn {line} rijdt hier, maar vertrekt niet meer vanaf {}.",
                hhmm(*after)
            ),
            RouteOutcome::NoDirectLine { from, to, board } => match board {
                Some((stop, departures)) => {
                    write!(f, "Geen directe lijn van '{from}' naar '{to}'.")?;
                    write!(f, "\nVertrektijden {stop}:")?;
                    for departure in departures {
                        write!(f, "\n  {departure}")?;
                    }
                    Ok(())
                }
                None => write!(f, "Geen route gevonden van '{from}' naar '{to}'."),
            },
        }
    }
}

/// Lines matched at one origin candidate, with their destination names.
#[derive(Debug)]
struct OriginMatch {
    origin: usize,
    lines: Vec<(String, String)>,
}

/// Matched (origin, line) pairs in discovery order.
#[derive(Debug, Default)]
struct Matches {
    entries: Vec<OriginMatch>,
}

impl Matches {
    /// Record a match. Returns false if the pair was already known.
    fn record(&mut self, origin: usize, line: &str, destination: &str) -> bool {
        let entry = match self.entries.iter().position(|m| m.origin == origin) {
            Some(i) => &mut self.entries[i],
            None => {
                self.entries.push(OriginMatch {
                    origin,
                    lines: Vec::new(),
                });
                let last = self.entries.len() - 1;
                &mut self.entries[last]
            }
        };
        if entry.lines.iter().any(|(l, _)| l == line) {
            return false;
        }
        entry.lines.push((line.to_string(), destination.to_string()));
        true
    }

    fn contains_origin(&self, origin: usize) -> bool {
        self.entries.iter().any(|m| m.origin == origin)
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves route queries against one stop directory.
pub struct RouteResolver<'a, D> {
    directory: &'a D,
    config: ResolverConfig,
}

impl<'a, D: StopDirectory> RouteResolver<'a, D> {
    pub fn new(directory: &'a D, config: ResolverConfig) -> Self {
        Self { directory, config }
    }

    /// Find the next departures on direct lines from `from` to `to` at or
    /// after `after`.
    pub async fn resolve(&self, from: &str, to: &str, after: NaiveDateTime) -> RouteOutcome {
        info!(
            provider = %self.directory.provider(),
            from,
            to,
            after = %hhmm(after),
            "Resolving route"
        );

        let cap = self.config.max_candidates;
        let (origins, destinations) = join(
            self.directory.search_stops(from, cap),
            self.directory.search_stops(to, cap),
        )
        .await;

        if origins.is_empty() {
            return RouteOutcome::OriginNotFound {
                name: from.to_string(),
            };
        }
        if destinations.is_empty() {
            return RouteOutcome::DestinationNotFound {
                name: to.to_string(),
            };
        }
        info!(
            origins = origins.len(),
            destinations = destinations.len(),
            "Stop candidates"
        );

        let index = self.destination_index(&destinations).await;
        debug!(lines = ?index.lines(), "Lines at destination");

        let mut matches = Matches::default();
        self.match_by_line_directory(&origins, &index, &mut matches)
            .await;

        let mut departures = HashMap::new();
        self.match_by_departures(&origins, &index, to, &mut matches, &mut departures)
            .await;
        info!(matched = matches.entries.len(), "Origin stops with a direct line");

        if matches.is_empty() {
            return self.no_direct_line(from, to, &origins, &departures);
        }

        self.fetch_missing(&origins, &matches, &mut departures)
            .await;

        let mut rows = Vec::new();
        for m in &matches.entries {
            let origin = &origins[m.origin];
            let Some(at_origin) = departures.get(&m.origin) else {
                continue;
            };
            for (line, destination) in &m.lines {
                rows.extend(
                    at_origin
                        .iter()
                        .filter(|d| &d.line == line)
                        .filter_map(|d| ItineraryLine::from_departure(d, &origin.name, destination))
                        .filter(|row| row.time >= after),
                );
            }
        }

        let rows = rank_rows(rows, self.config.max_routes);
        if rows.is_empty() {
            let first = &matches.entries[0];
            let (line, destination) = &first.lines[0];
            return RouteOutcome::NothingAfter {
                origin: origins[first.origin].name.clone(),
                destination: destination.clone(),
                line: line.clone(),
                after,
            };
        }

        RouteOutcome::Routes(rows)
    }

    /// Lines serving any destination candidate. Candidates are indexed in
    /// search order, so the first one listed wins a shared key.
    async fn destination_index(&self, destinations: &[StopCandidate]) -> DestinationIndex {
        let lines = join_all(destinations.iter().map(|d| self.directory.lines_at(d))).await;

        let mut index = DestinationIndex::default();
        for (stop, lines) in destinations.iter().zip(lines) {
            for line in &lines {
                for key in self.directory.line_keys(stop, line) {
                    index.insert(key, &stop.name);
                }
            }
        }
        index
    }

    /// Pass 1: look up every line the directory lists at each origin.
    async fn match_by_line_directory(
        &self,
        origins: &[StopCandidate],
        index: &DestinationIndex,
        matches: &mut Matches,
    ) {
        let lines = join_all(origins.iter().map(|o| self.directory.lines_at(o))).await;

        for (i, (origin, lines)) in origins.iter().zip(lines).enumerate() {
            for line in &lines {
                let destination = self
                    .directory
                    .line_keys(origin, line)
                    .iter()
                    .find_map(|key| index.get(key));
                if let Some(destination) = destination
                    && matches.record(i, &line.line, destination)
                {
                    debug!(origin = %origin.name, line = %line.line, destination, "Pass 1 match");
                }
            }
        }
    }

    /// Pass 2: scan departures at origins Pass 1 left unmatched.
    ///
    /// Fetched departures are kept in `departures` for reuse.
    async fn match_by_departures(
        &self,
        origins: &[StopCandidate],
        index: &DestinationIndex,
        fallback_name: &str,
        matches: &mut Matches,
        departures: &mut HashMap<usize, Vec<Departure>>,
    ) {
        let unmatched: Vec<usize> = (0..origins.len())
            .filter(|&i| !matches.contains_origin(i))
            .collect();
        let fetched = join_all(
            unmatched
                .iter()
                .map(|&i| self.directory.departures_at(&origins[i])),
        )
        .await;

        for (i, at_origin) in unmatched.into_iter().zip(fetched) {
            let origin = &origins[i];
            for departure in &at_origin {
                if !index.serves_line(&departure.line) {
                    continue;
                }
                let own_scope = LineKey {
                    scope: origin.id.scope().map(str::to_string),
                    line: departure.line.clone(),
                };
                let destination = index
                    .get(&own_scope)
                    .or_else(|| index.get_line(&departure.line))
                    .unwrap_or(fallback_name);
                if matches.record(i, &departure.line, destination) {
                    debug!(
                        origin = %origin.name,
                        line = %departure.line,
                        destination,
                        "Pass 2 match (departure scan)"
                    );
                }
            }
            departures.insert(i, at_origin);
        }
    }

    /// Fetch departures for matched origins not already fetched in Pass 2.
    async fn fetch_missing(
        &self,
        origins: &[StopCandidate],
        matches: &Matches,
        departures: &mut HashMap<usize, Vec<Departure>>,
    ) {
        let missing: Vec<usize> = matches
            .entries
            .iter()
            .map(|m| m.origin)
            .filter(|i| !departures.contains_key(i))
            .collect();
        let fetched = join_all(
            missing
                .iter()
                .map(|&i| self.directory.departures_at(&origins[i])),
        )
        .await;
        departures.extend(missing.into_iter().zip(fetched));
    }

    /// Every origin went through Pass 2, so its departures are cached.
    fn no_direct_line(
        &self,
        from: &str,
        to: &str,
        origins: &[StopCandidate],
        departures: &HashMap<usize, Vec<Departure>>,
    ) -> RouteOutcome {
        let board = (0..origins.len()).find_map(|i| {
            let at_origin = departures.get(&i).filter(|d| !d.is_empty())?;
            let shown = at_origin
                .iter()
                .take(self.config.fallback_departures)
                .cloned()
                .collect();
            Some((origins[i].name.clone(), shown))
        });

        RouteOutcome::NoDirectLine {
            from: from.to_string(),
            to: to.to_string(),
            board,
        }
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
