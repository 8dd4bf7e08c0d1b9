//! Geocoding and directions client.

use std::fmt;

use chrono::{Local, NaiveDateTime, TimeZone};
use tracing::{info, warn};

use crate::command::{DirectionsQuery, Language, TravelMode};
use crate::domain::hhmm;
use crate::enrich::PlatformSource;
use crate::http::{DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS, LimitedClient, USER_AGENT};

use super::error::DirectionsError;
use super::route::{TransitRoute, WalkingRoute};
use super::types::{DirectionsResponse, GeocodeResponse, LatLng, RouteRecord, check_status};

const DEFAULT_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Region bias for geocoding and directions.
const REGION: &str = "be";

/// Configuration for the directions client.
#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    /// API key
    pub api_key: String,
    /// Directions endpoint
    pub directions_url: String,
    /// Geocoding endpoint
    pub geocode_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DirectionsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            directions_url: DEFAULT_DIRECTIONS_URL.to_string(),
            geocode_url: DEFAULT_GEOCODE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_directions_url(mut self, url: impl Into<String>) -> Self {
        self.directions_url = url.into();
        self
    }

    pub fn with_geocode_url(mut self, url: impl Into<String>) -> Self {
        self.geocode_url = url.into();
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// The answer to a directions query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionsOutcome {
    /// A place could not be geocoded.
    LocationNotFound { place: String, language: Language },

    /// Both places are known but no route connects them.
    NoRoute {
        origin: String,
        destination: String,
        language: Language,
    },

    /// Rendered routes, one per line.
    Routes(Vec<String>),
}

impl DirectionsOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DirectionsOutcome::Routes(_))
    }
}

impl fmt::Display for DirectionsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionsOutcome::LocationNotFound { place, language } => match language {
                Language::Dutch => write!(f, "Locatie niet gevonden: '{place}'."),
                Language::French => write!(f, "Lieu introuvable: '{place}'."),
            },
            DirectionsOutcome::NoRoute {
                origin,
                destination,
                language,
            } => match language {
                Language::Dutch => write!(f, "Geen route van '{origin}' naar '{destination}'."),
                Language::French => {
                    write!(f, "Aucun itineraire de '{origin}' vers '{destination}'.")
                }
            },
            DirectionsOutcome::Routes(rows) => f.write_str(&rows.join("\n")),
        }
    }
}

/// Geocoding and directions API client.
#[derive(Debug, Clone)]
pub struct DirectionsClient {
    http: LimitedClient,
    api_key: String,
    directions_url: String,
    geocode_url: String,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, DirectionsError> {
        let http = LimitedClient::new(
            &[("accept", "application/json"), ("user-agent", USER_AGENT)],
            config.timeout_secs,
            config.max_concurrent,
        )?;

        Ok(Self {
            http,
            api_key: config.api_key,
            directions_url: config.directions_url,
            geocode_url: config.geocode_url,
        })
    }

    /// Coordinates of the best match for `place` in Belgium.
    pub async fn geocode(
        &self,
        place: &str,
        language: Language,
    ) -> Result<Option<LatLng>, DirectionsError> {
        let response: GeocodeResponse = self
            .http
            .get_json(
                &self.geocode_url,
                &[
                    ("address", place),
                    ("region", REGION),
                    ("components", "country:BE"),
                    ("language", language.code()),
                    ("key", self.api_key.as_str()),
                ],
            )
            .await?;
        check_status(&response.status, response.error_message.as_deref())?;

        let location = response.results.first().map(|r| r.geometry.location);
        info!(place, found = location.is_some(), "Geocode");
        Ok(location)
    }

    /// Routes between two coordinates, departing at `departure` (local time).
    pub async fn routes(
        &self,
        origin: LatLng,
        destination: LatLng,
        query: &DirectionsQuery,
    ) -> Result<Vec<RouteRecord>, DirectionsError> {
        let params = directions_params(origin, destination, query, &self.api_key);
        let response: DirectionsResponse =
            self.http.get_json(&self.directions_url, &params).await?;
        check_status(&response.status, response.error_message.as_deref())?;
        Ok(response.routes)
    }

    /// Answer a directions query end to end.
    ///
    /// Provider failures are logged and reported as "not found" or "no
    /// route". Rail rides without platforms are enriched from `platforms`.
    pub async fn plan<S: PlatformSource>(
        &self,
        query: &DirectionsQuery,
        platforms: &S,
    ) -> DirectionsOutcome {
        info!(
            origin = %query.origin,
            destination = %query.destination,
            mode = ?query.mode,
            language = query.language.code(),
            departure = %hhmm(query.departure),
            "Planning directions"
        );

        let (origin, destination) = futures::future::join(
            self.geocode_or_none(&query.origin, query.language),
            self.geocode_or_none(&query.destination, query.language),
        )
        .await;

        let Some(origin) = origin else {
            return DirectionsOutcome::LocationNotFound {
                place: query.origin.clone(),
                language: query.language,
            };
        };
        let Some(destination) = destination else {
            return DirectionsOutcome::LocationNotFound {
                place: query.destination.clone(),
                language: query.language,
            };
        };

        let records = match self.routes(origin, destination, query).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Directions request failed");
                Vec::new()
            }
        };

        let rows = render_routes(records, query, platforms).await;
        if rows.is_empty() {
            return DirectionsOutcome::NoRoute {
                origin: query.origin.clone(),
                destination: query.destination.clone(),
                language: query.language,
            };
        }
        DirectionsOutcome::Routes(rows)
    }

    async fn geocode_or_none(&self, place: &str, language: Language) -> Option<LatLng> {
        self.geocode(place, language).await.unwrap_or_else(|e| {
            warn!(place, error = %e, "Geocode failed");
            None
        })
    }
}

async fn render_routes<S: PlatformSource>(
    records: Vec<RouteRecord>,
    query: &DirectionsQuery,
    platforms: &S,
) -> Vec<String> {
    match &query.mode {
        TravelMode::Walking => records
            .into_iter()
            .next()
            .and_then(WalkingRoute::from_record)
            .map(|route| vec![route.render()])
            .unwrap_or_default(),
        TravelMode::Transit { max_routes, .. } => {
            let mut rows = Vec::new();
            for record in records.into_iter().take(*max_routes) {
                let Some(mut route) = TransitRoute::from_record(record) else {
                    continue;
                };
                route.enrich(platforms).await;
                rows.push(route.render(query.language));
            }
            rows
        }
    }
}

/// Unix seconds of a local wall-clock time.
fn local_unix(at: NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(&at)
        .earliest()
        .map_or_else(|| at.and_utc().timestamp(), |t| t.timestamp())
}

fn directions_params(
    origin: LatLng,
    destination: LatLng,
    query: &DirectionsQuery,
    api_key: &str,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("origin", origin.as_param()),
        ("destination", destination.as_param()),
        ("language", query.language.code().to_string()),
        ("region", REGION.to_string()),
        ("key", api_key.to_string()),
        ("departure_time", local_unix(query.departure).to_string()),
    ];

    match &query.mode {
        TravelMode::Walking => params.push(("mode", "walking".to_string())),
        TravelMode::Transit { modes, .. } => {
            let modes: Vec<&str> = modes.iter().map(|m| m.as_param()).collect();
            params.push(("mode", "transit".to_string()));
            params.push(("transit_mode", modes.join("|")));
            params.push(("alternatives", "true".to_string()));
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::TransitMode;
    use crate::enrich::TimedPlatforms;
    use chrono::{DateTime, NaiveDate, Utc};

    fn query(mode: TravelMode) -> DirectionsQuery {
        DirectionsQuery {
            origin: "Flagey, Brussel".into(),
            destination: "Montgomery, Brussel".into(),
            mode,
            language: Language::Dutch,
            departure: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    struct NoPlatforms;

    impl PlatformSource for NoPlatforms {
        async fn connections_near(
            &self,
            _from: &str,
            _to: &str,
            _at: DateTime<Utc>,
        ) -> Vec<TimedPlatforms> {
            Vec::new()
        }
    }

    const ORIGIN: LatLng = LatLng {
        lat: 50.83,
        lng: 4.37,
    };
    const DESTINATION: LatLng = LatLng {
        lat: 50.84,
        lng: 4.41,
    };

    #[test]
    fn transit_params() {
        let q = query(TravelMode::Transit {
            modes: vec![TransitMode::Bus, TransitMode::Tram, TransitMode::Subway],
            max_routes: 3,
        });
        let params = directions_params(ORIGIN, DESTINATION, &q, "secret");

        assert_eq!(param(&params, "mode"), Some("transit"));
        assert_eq!(param(&params, "transit_mode"), Some("bus|tram|subway"));
        assert_eq!(param(&params, "alternatives"), Some("true"));
        assert_eq!(param(&params, "origin"), Some("50.83,4.37"));
        assert_eq!(param(&params, "region"), Some("be"));
        assert!(param(&params, "departure_time").is_some());
    }

    #[test]
    fn walking_params() {
        let params = directions_params(ORIGIN, DESTINATION, &query(TravelMode::Walking), "k");
        assert_eq!(param(&params, "mode"), Some("walking"));
        assert_eq!(param(&params, "transit_mode"), None);
    }

    #[test]
    fn outcome_messages() {
        let outcome = DirectionsOutcome::LocationNotFound {
            place: "Atlantis".into(),
            language: Language::French,
        };
        assert_eq!(outcome.to_string(), "Lieu introuvable: 'Atlantis'.");
        assert!(!outcome.is_success());

        let outcome = DirectionsOutcome::NoRoute {
            origin: "Leuven".into(),
            destination: "Gent".into(),
            language: Language::Dutch,
        };
        assert_eq!(outcome.to_string(), "Geen route van 'Leuven' naar 'Gent'.");
    }

    #[tokio::test]
    async fn transit_rows_are_capped() {
        let record = || -> RouteRecord {
            serde_json::from_str(
                r#"{"legs": [{
                    "departure_time": {"text": "09:05"},
                    "arrival_time": {"text": "09:20"},
                    "duration": {"value": 900},
                    "steps": [{
                        "travel_mode": "TRANSIT",
                        "transit_details": {
                            "departure_stop": {"name": "Flagey"},
                            "arrival_stop": {"name": "Montgomery"},
                            "departure_time": {"text": "09:05"},
                            "arrival_time": {"text": "09:20"},
                            "line": {"short_name": "81", "vehicle": {"type": "TRAM"}}
                        }
                    }]
                }]}"#,
            )
            .unwrap()
        };
        let q = query(TravelMode::Transit {
            modes: vec![TransitMode::Tram],
            max_routes: 2,
        });

        let rows = render_routes(vec![record(), record(), record()], &q, &NoPlatforms).await;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "09:05 Flagey tram -> Montgomery 09:20 (15min)");
    }

    #[tokio::test]
    async fn walking_uses_first_route() {
        let rows = render_routes(Vec::new(), &query(TravelMode::Walking), &NoPlatforms).await;
        assert!(rows.is_empty());
    }

    #[test]
    fn client_creation() {
        let config = DirectionsConfig::new("key")
            .with_directions_url("http://localhost/directions")
            .with_geocode_url("http://localhost/geocode")
            .with_timeout(2)
            .with_max_concurrent(1);
        assert!(DirectionsClient::new(config).is_ok());
    }
}
