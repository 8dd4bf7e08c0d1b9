//! Departure board for a single stop name.

use std::fmt;

use tracing::info;

use crate::directory::StopDirectory;
use crate::domain::Departure;

use super::config::ResolverConfig;

/// The answer to a board query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardOutcome {
    NotFound { name: String },
    NoDepartures { name: String },
    Board { stop: String, departures: Vec<Departure> },
}

impl BoardOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BoardOutcome::Board { .. })
    }
}

impl fmt::Display for BoardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardOutcome::NotFound { name } => write!(f, "Halte '{name}' niet gevonden."),
            BoardOutcome::NoDepartures { name } => {
                write!(f, "Geen vertrektijden voor '{name}'.")
            }
            BoardOutcome::Board { stop, departures } => {
                f.write_str(stop)?;
                for departure in departures {
                    write!(f, "\n  {departure}")?;
                }
                Ok(())
            }
        }
    }
}

/// Show upcoming departures at the first stop matching `name` that has any.
///
/// Candidates are tried one at a time in search order, so a busy stop
/// found first costs a single departures call.
pub async fn stop_board<D: StopDirectory>(
    directory: &D,
    name: &str,
    config: &ResolverConfig,
) -> BoardOutcome {
    let candidates = directory.search_stops(name, config.max_candidates).await;
    if candidates.is_empty() {
        return BoardOutcome::NotFound {
            name: name.to_string(),
        };
    }

    for candidate in &candidates {
        let departures = directory.departures_at(candidate).await;
        if departures.is_empty() {
            continue;
        }
        info!(
            provider = %directory.provider(),
            stop = %candidate.name,
            departures = departures.len(),
            "Board"
        );
        return BoardOutcome::Board {
            stop: candidate.name.clone(),
            departures: departures
                .into_iter()
                .take(config.board_departures)
                .collect(),
        };
    }

    BoardOutcome::NoDepartures {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::domain::{Provider, StopId};
    use chrono::NaiveDate;

    fn dep(line: &str, minute: u32) -> Departure {
        let t = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, minute, 0)
            .unwrap();
        Departure::new(line, "Aarschot").with_scheduled(t)
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new(Provider::RegionalBus)
            .with_stop(StopId::scoped("3", "1"), "Leuven Station perron 1")
            .with_stop(StopId::scoped("3", "2"), "Leuven Station perron 2")
    }

    #[tokio::test]
    async fn first_stop_with_departures_wins() {
        let dir = directory().with_realtime(
            StopId::scoped("3", "2"),
            (0..10).map(|i| dep("35", i * 5)).collect(),
        );

        let outcome = stop_board(&dir, "leuven", &ResolverConfig::default()).await;

        let BoardOutcome::Board { stop, departures } = &outcome else {
            panic!("expected a board, got {outcome:?}");
        };
        assert_eq!(stop, "Leuven Station perron 2");
        assert_eq!(departures.len(), 6);
        assert!(
            outcome
                .to_string()
                .starts_with("Leuven Station perron 2\n  09:00 lijn 35 -> Aarschot")
        );
    }

    #[tokio::test]
    async fn stops_after_first_hit() {
        let dir = directory()
            .with_realtime(StopId::scoped("3", "1"), vec![dep("2", 10)])
            .with_realtime(StopId::scoped("3", "2"), vec![dep("3", 12)]);

        let outcome = stop_board(&dir, "leuven", &ResolverConfig::default()).await;

        assert_eq!(outcome.to_string(), "Leuven Station perron 1\n  09:10 lijn 2 -> Aarschot");
        assert_eq!(dir.calls().realtime, 1);
    }

    #[tokio::test]
    async fn not_found() {
        let outcome = stop_board(&directory(), "atlantis", &ResolverConfig::default()).await;
        assert_eq!(outcome.to_string(), "Halte 'atlantis' niet gevonden.");
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn no_departures_anywhere() {
        let outcome = stop_board(&directory(), "leuven", &ResolverConfig::default()).await;
        assert_eq!(
            outcome,
            BoardOutcome::NoDepartures {
                name: "leuven".into()
            }
        );
    }
}
