//! Platform enrichment from a rail-authoritative source.
//!
//! The directions provider often omits platforms for rail legs. When a leg
//! has a known departure timestamp, the rail network is asked for
//! connections between the same two stations around that time, and the
//! platforms of the one departing within [`PLATFORM_TOLERANCE_SECS`] are
//! copied over. No match leaves the leg as it was.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, info};

/// Maximum distance between the requested and the matched departure.
pub const PLATFORM_TOLERANCE_SECS: i64 = 120;

static PLATFORM_IN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*[-–]?\s*(?:perron|spoor|quai|voie|platform|track|gleis|binario)\s*([A-Za-z0-9]+)\s*$",
    )
    .expect("valid regex")
});

static STATION_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:station|gare|stazione|bahnhof|halt)\b(?:\s+(?:de|du|des|van)\b)?\s*")
        .expect("valid regex")
});

/// Departure and arrival platforms of one leg.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platforms {
    pub departure: Option<String>,
    pub arrival: Option<String>,
}

impl Platforms {
    pub fn is_empty(&self) -> bool {
        self.departure.is_none() && self.arrival.is_none()
    }
}

/// A connection offered by the platform source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedPlatforms {
    pub departure_time: DateTime<Utc>,
    pub platforms: Platforms,
}

/// A source that knows platforms for rail connections.
#[allow(async_fn_in_trait)]
pub trait PlatformSource {
    /// Connections from `from` to `to` departing around `at`.
    ///
    /// Failures are reported as an empty list.
    async fn connections_near(&self, from: &str, to: &str, at: DateTime<Utc>)
    -> Vec<TimedPlatforms>;
}

/// First candidate departing within `tolerance_secs` of `at`.
pub fn pick_connection(
    candidates: &[TimedPlatforms],
    at: DateTime<Utc>,
    tolerance_secs: i64,
) -> Option<&TimedPlatforms> {
    candidates
        .iter()
        .find(|c| (c.departure_time - at).num_seconds().abs() <= tolerance_secs)
}

/// Strip "Station", "Gare" and similar words so the rail network
/// recognizes the name. Falls back to the input if nothing is left.
///
/// ```
/// use transit_sms::enrich::clean_station_name;
///
/// assert_eq!(clean_station_name("Station Tienen"), "Tienen");
/// assert_eq!(clean_station_name("Landen"), "Landen");
/// ```
pub fn clean_station_name(name: &str) -> String {
    let cleaned = STATION_NOISE.replace_all(name, "");
    let cleaned = cleaned.trim_matches(|c| matches!(c, ' ' | '-' | '–' | ','));
    if cleaned.is_empty() {
        name.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Split a trailing platform designation off a stop name.
///
/// `"Leuven perron 3"` becomes `("Leuven", Some("3"))`.
pub fn split_platform_from_name(name: &str) -> (String, Option<String>) {
    match PLATFORM_IN_NAME.captures(name) {
        Some(caps) => {
            let start = caps.get(0).map_or(name.len(), |m| m.start());
            let platform = caps.get(1).map(|m| m.as_str().to_string());
            (name[..start].trim().to_string(), platform)
        }
        None => (name.to_string(), None),
    }
}

/// Look up platforms for a rail leg. Returns empty platforms when the
/// source has no connection within tolerance.
pub async fn enrich_platforms<S: PlatformSource>(
    source: &S,
    departure_stop: &str,
    arrival_stop: &str,
    at: DateTime<Utc>,
) -> Platforms {
    let from = clean_station_name(departure_stop);
    let to = clean_station_name(arrival_stop);
    debug!(%from, %to, %at, "Platform lookup");

    let candidates = source.connections_near(&from, &to, at).await;
    match pick_connection(&candidates, at, PLATFORM_TOLERANCE_SECS) {
        Some(found) => {
            info!(
                %from,
                %to,
                departure = ?found.platforms.departure,
                arrival = ?found.platforms.arrival,
                "Platform match"
            );
            found.platforms.clone()
        }
        None => {
            debug!(%from, %to, candidates = candidates.len(), "No platform match in tolerance");
            Platforms::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 13, 30, 0).unwrap()
    }

    fn candidate(offset_secs: i64, dep: &str, arr: &str) -> TimedPlatforms {
        TimedPlatforms {
            departure_time: at() + Duration::seconds(offset_secs),
            platforms: Platforms {
                departure: Some(dep.into()),
                arrival: Some(arr.into()),
            },
        }
    }

    #[test]
    fn ninety_seconds_off_is_accepted() {
        let candidates = [candidate(90, "3", "7")];
        let found = pick_connection(&candidates, at(), PLATFORM_TOLERANCE_SECS).unwrap();
        assert_eq!(found.platforms.departure.as_deref(), Some("3"));
    }

    #[test]
    fn five_minutes_off_is_rejected() {
        let candidates = [candidate(300, "3", "7"), candidate(-300, "4", "8")];
        assert!(pick_connection(&candidates, at(), PLATFORM_TOLERANCE_SECS).is_none());
    }

    #[test]
    fn first_in_tolerance_wins() {
        let candidates = [
            candidate(-600, "1", "1"),
            candidate(-60, "2", "5"),
            candidate(0, "3", "6"),
        ];
        let found = pick_connection(&candidates, at(), PLATFORM_TOLERANCE_SECS).unwrap();
        assert_eq!(found.platforms.departure.as_deref(), Some("2"));
    }

    #[test]
    fn boundary_is_inclusive() {
        let candidates = [candidate(-120, "2", "5")];
        assert!(pick_connection(&candidates, at(), PLATFORM_TOLERANCE_SECS).is_some());
    }

    #[test]
    fn station_noise_removed() {
        assert_eq!(clean_station_name("Station Tienen"), "Tienen");
        assert_eq!(clean_station_name("Leuven station"), "Leuven");
        assert_eq!(clean_station_name("Gare de Namur"), "Namur");
        assert_eq!(clean_station_name("Gare du Midi"), "Midi");
        assert_eq!(clean_station_name("Station van Brugge"), "Brugge");
        assert_eq!(clean_station_name("Hasselt"), "Hasselt");
        assert_eq!(clean_station_name("Station"), "Station");
    }

    #[test]
    fn platform_split_from_name() {
        assert_eq!(
            split_platform_from_name("Leuven perron 3"),
            ("Leuven".to_string(), Some("3".to_string()))
        );
        assert_eq!(
            split_platform_from_name("Bruxelles-Midi - Quai 12b"),
            ("Bruxelles-Midi".to_string(), Some("12b".to_string()))
        );
        assert_eq!(
            split_platform_from_name("Gent-Sint-Pieters"),
            ("Gent-Sint-Pieters".to_string(), None)
        );
    }

    struct FakeSource {
        candidates: Vec<TimedPlatforms>,
        queries: Mutex<Vec<(String, String)>>,
    }

    impl PlatformSource for FakeSource {
        async fn connections_near(
            &self,
            from: &str,
            to: &str,
            _at: DateTime<Utc>,
        ) -> Vec<TimedPlatforms> {
            self.queries
                .lock()
                .unwrap()
                .push((from.to_string(), to.to_string()));
            self.candidates.clone()
        }
    }

    #[tokio::test]
    async fn enrich_queries_clean_names() {
        let source = FakeSource {
            candidates: vec![candidate(30, "11", "2")],
            queries: Mutex::new(Vec::new()),
        };

        let platforms = enrich_platforms(&source, "Station Leuven", "Station Tienen", at()).await;

        assert_eq!(platforms.departure.as_deref(), Some("11"));
        assert_eq!(platforms.arrival.as_deref(), Some("2"));
        assert_eq!(
            source.queries.lock().unwrap().as_slice(),
            [("Leuven".to_string(), "Tienen".to_string())]
        );
    }

    #[tokio::test]
    async fn enrich_without_match_is_empty() {
        let source = FakeSource {
            candidates: vec![candidate(300, "11", "2")],
            queries: Mutex::new(Vec::new()),
        };

        let platforms = enrich_platforms(&source, "Leuven", "Tienen", at()).await;
        assert!(platforms.is_empty());
    }
}
