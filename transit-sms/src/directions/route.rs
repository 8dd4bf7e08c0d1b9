//! Directions results and their reply rendering.

use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use crate::command::Language;
use crate::enrich::{PlatformSource, enrich_platforms, split_platform_from_name};

use super::types::{LegRecord, RouteRecord, StepRecord, TransitDetails};

/// Walking steps shorter than this are left out of transit routes.
const MIN_TRANSIT_WALK_METRES: i64 = 200;

/// Walking instructions shorter than this are left out of walking routes.
const MIN_INSTRUCTION_METRES: i64 = 20;

/// Vehicle types served by the rail network.
const RAIL_VEHICLES: [&str; 3] = ["HEAVY_RAIL", "COMMUTER_TRAIN", "RAIL"];

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// `42min` or `1u05`.
pub fn format_duration(secs: i64) -> String {
    let minutes = secs.max(0) / 60;
    if minutes < 60 {
        format!("{minutes}min")
    } else {
        format!("{}u{:02}", minutes / 60, minutes % 60)
    }
}

/// `350m` or `1.5km`.
pub fn format_distance(metres: i64) -> String {
    if metres < 1000 {
        return format!("{metres}m");
    }
    let km = format!("{:.1}", metres as f64 / 1000.0);
    format!("{}km", km.trim_end_matches('0').trim_end_matches('.'))
}

fn strip_html(text: &str) -> String {
    let plain = HTML_TAG.replace_all(text, " ");
    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn vehicle_label(kind: &str, language: Language) -> &'static str {
    match (kind, language) {
        ("BUS", _) => "bus",
        ("TRAM", _) => "tram",
        ("SUBWAY", _) => "metro",
        ("HEAVY_RAIL" | "COMMUTER_TRAIN" | "RAIL", Language::Dutch) => "trein",
        ("HEAVY_RAIL" | "COMMUTER_TRAIN" | "RAIL", Language::French) => "train",
        ("FERRY", Language::Dutch) => "veer",
        ("FERRY", Language::French) => "ferry",
        ("CABLE_CAR", Language::Dutch) => "kabelbaan",
        ("CABLE_CAR", Language::French) => "telepherique",
        ("FUNICULAR", _) => "",
        _ => "bus",
    }
}

fn walk_label(language: Language) -> &'static str {
    match language {
        Language::Dutch => "te voet",
        Language::French => "a pied",
    }
}

/// One ride on a transit vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ride {
    pub departure_text: String,
    /// Unix seconds of the scheduled departure
    pub departure_unix: Option<i64>,
    pub departure_stop: String,
    pub departure_platform: Option<String>,
    pub arrival_text: String,
    pub arrival_stop: String,
    pub arrival_platform: Option<String>,
    pub vehicle: String,
    pub num_stops: Option<u32>,
}

impl Ride {
    fn from_details(details: TransitDetails) -> Self {
        let TransitDetails {
            departure_stop,
            arrival_stop,
            departure_time,
            arrival_time,
            line,
            num_stops,
            departure_platform,
            arrival_platform,
        } = details;

        // A platform inside the stop name wins over the explicit fields.
        let (dep_name, dep_in_name) = split_platform_from_name(&departure_stop.name);
        let (arr_name, arr_in_name) = split_platform_from_name(&arrival_stop.name);
        let dep_platform = dep_in_name
            .or(departure_stop.platform)
            .or(departure_stop.track)
            .or(departure_platform);
        let arr_platform = arr_in_name
            .or(arrival_stop.platform)
            .or(arrival_stop.track)
            .or(arrival_platform);

        let departure_time = departure_time.unwrap_or_default();
        let arrival_time = arrival_time.unwrap_or_default();

        Self {
            departure_text: or_unknown(departure_time.text),
            departure_unix: departure_time.value,
            departure_stop: or_unknown(dep_name),
            departure_platform: non_empty(dep_platform),
            arrival_text: or_unknown(arrival_time.text),
            arrival_stop: or_unknown(arr_name),
            arrival_platform: non_empty(arr_platform),
            vehicle: line
                .vehicle
                .map(|v| v.kind)
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| "BUS".to_string()),
            num_stops: num_stops.filter(|&n| n > 0),
        }
    }

    /// Rail ride with a known departure and no platform either side.
    pub fn needs_platforms(&self) -> bool {
        RAIL_VEHICLES.contains(&self.vehicle.as_str())
            && self.departure_unix.is_some()
            && self.departure_platform.is_none()
            && self.arrival_platform.is_none()
    }

    fn render(&self, language: Language) -> String {
        let mut out = format!("{} {}", self.departure_text, self.departure_stop);
        if let Some(p) = &self.departure_platform {
            out.push_str(&format!(" sp.{p}"));
        }
        out.push_str(&format!(" {}", vehicle_label(&self.vehicle, language)));
        if let Some(n) = self.num_stops {
            out.push_str(&format!(" ({n} haltes)"));
        }
        out.push_str(&format!(" -> {}", self.arrival_stop));
        if let Some(p) = &self.arrival_platform {
            out.push_str(&format!(" sp.{p}"));
        }
        out.push_str(&format!(" {}", self.arrival_text));
        out
    }
}

fn or_unknown(text: String) -> String {
    if text.trim().is_empty() {
        "?".to_string()
    } else {
        text
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Walk { metres: i64 },
    Ride(Ride),
}

impl Step {
    fn from_record(record: StepRecord) -> Option<Self> {
        match record.travel_mode.as_str() {
            "WALKING" => Some(Step::Walk {
                metres: record.distance.map_or(0, |d| d.value),
            }),
            "TRANSIT" => Some(Step::Ride(Ride::from_details(record.transit_details?))),
            _ => None,
        }
    }
}

/// A public transport route: the first leg of a directions result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitRoute {
    pub steps: Vec<Step>,
    pub departure_text: String,
    pub arrival_text: String,
    pub duration_secs: i64,
}

impl TransitRoute {
    pub fn from_record(route: RouteRecord) -> Option<Self> {
        let leg: LegRecord = route.legs.into_iter().next()?;
        Some(Self {
            departure_text: or_unknown(leg.departure_time.unwrap_or_default().text),
            arrival_text: or_unknown(leg.arrival_time.unwrap_or_default().text),
            duration_secs: leg.duration.map_or(0, |d| d.value),
            steps: leg.steps.into_iter().filter_map(Step::from_record).collect(),
        })
    }

    /// Fill in missing rail platforms from `source`.
    pub async fn enrich<S: PlatformSource>(&mut self, source: &S) {
        for step in &mut self.steps {
            let Step::Ride(ride) = step else { continue };
            if !ride.needs_platforms() {
                continue;
            }
            let Some(at) = ride.departure_unix.and_then(|t| DateTime::from_timestamp(t, 0)) else {
                continue;
            };
            let found =
                enrich_platforms(source, &ride.departure_stop, &ride.arrival_stop, at).await;
            ride.departure_platform = found.departure;
            ride.arrival_platform = found.arrival;
        }
    }

    /// `ride | ~walk | ride (duration)`; rides and long walks only.
    pub fn render(&self, language: Language) -> String {
        let parts: Vec<String> = self
            .steps
            .iter()
            .filter_map(|step| match step {
                Step::Walk { metres } if *metres > MIN_TRANSIT_WALK_METRES => Some(format!(
                    "~{} {}",
                    format_distance(*metres),
                    walk_label(language)
                )),
                Step::Walk { .. } => None,
                Step::Ride(ride) => Some(ride.render(language)),
            })
            .collect();

        let duration = format_duration(self.duration_secs);
        if parts.is_empty() {
            format!(
                "{} -> {} ({duration})",
                self.departure_text, self.arrival_text
            )
        } else {
            format!("{} ({duration})", parts.join(" | "))
        }
    }
}

/// A walking route: instructions with distances, plus totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkingRoute {
    pub instructions: Vec<(String, i64)>,
    pub distance_metres: i64,
    pub duration_secs: i64,
}

impl WalkingRoute {
    pub fn from_record(route: RouteRecord) -> Option<Self> {
        let leg = route.legs.into_iter().next()?;
        Some(Self {
            distance_metres: leg.distance.map_or(0, |d| d.value),
            duration_secs: leg.duration.map_or(0, |d| d.value),
            instructions: leg
                .steps
                .into_iter()
                .map(|s| (strip_html(&s.html_instructions), s.distance.map_or(0, |d| d.value)))
                .collect(),
        })
    }

    /// `instr (dist), instr (dist) -- total, duration`.
    pub fn render(&self) -> String {
        let summary = format!(
            "{}, {}",
            format_distance(self.distance_metres),
            format_duration(self.duration_secs)
        );
        let parts: Vec<String> = self
            .instructions
            .iter()
            .filter(|(text, metres)| *metres >= MIN_INSTRUCTION_METRES && !text.is_empty())
            .map(|(text, metres)| format!("{text} ({})", format_distance(*metres)))
            .collect();

        if parts.is_empty() {
            summary
        } else {
            format!("{} -- {summary}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::{Platforms, TimedPlatforms};
    use chrono::Utc;

    const TRANSIT_ROUTE: &str = r#"{
        "legs": [{
            "departure_time": {"text": "13:22", "value": 1710508920},
            "arrival_time": {"text": "14:31", "value": 1710513060},
            "duration": {"value": 4140},
            "steps": [
                {"travel_mode": "WALKING", "distance": {"value": 450}},
                {
                    "travel_mode": "TRANSIT",
                    "transit_details": {
                        "departure_stop": {"name": "Station Leuven"},
                        "arrival_stop": {"name": "Brussel-Centraal"},
                        "departure_time": {"text": "13:30", "value": 1710509400},
                        "arrival_time": {"text": "13:55", "value": 1710510900},
                        "line": {"short_name": "IC", "vehicle": {"type": "HEAVY_RAIL"}},
                        "num_stops": 2
                    }
                },
                {"travel_mode": "WALKING", "distance": {"value": 120}},
                {
                    "travel_mode": "TRANSIT",
                    "transit_details": {
                        "departure_stop": {"name": "Centraal Station perron 3"},
                        "arrival_stop": {"name": "Montgomery"},
                        "departure_time": {"text": "14:05"},
                        "arrival_time": {"text": "14:20"},
                        "line": {"short_name": "1", "vehicle": {"type": "SUBWAY"}},
                        "num_stops": 6
                    }
                }
            ]
        }]
    }"#;

    fn transit_route() -> TransitRoute {
        TransitRoute::from_record(serde_json::from_str(TRANSIT_ROUTE).unwrap()).unwrap()
    }

    struct FixedSource(Vec<TimedPlatforms>);

    impl PlatformSource for FixedSource {
        async fn connections_near(
            &self,
            _from: &str,
            _to: &str,
            _at: DateTime<Utc>,
        ) -> Vec<TimedPlatforms> {
            self.0.clone()
        }
    }

    #[test]
    fn durations_and_distances() {
        assert_eq!(format_duration(2520), "42min");
        assert_eq!(format_duration(3900), "1u05");
        assert_eq!(format_distance(350), "350m");
        assert_eq!(format_distance(1500), "1.5km");
        assert_eq!(format_distance(2000), "2km");
    }

    #[test]
    fn html_stripped() {
        assert_eq!(
            strip_html("Sla <b>linksaf</b> naar <b>Bondgenotenlaan</b>"),
            "Sla linksaf naar Bondgenotenlaan"
        );
    }

    #[test]
    fn render_transit_route() {
        assert_eq!(
            transit_route().render(Language::Dutch),
            "~450m te voet | 13:30 Station Leuven trein (2 haltes) -> Brussel-Centraal 13:55 \
             | 14:05 Centraal Station sp.3 metro (6 haltes) -> Montgomery 14:20 (1u09)"
        );
    }

    #[test]
    fn render_in_french() {
        let text = transit_route().render(Language::French);
        assert!(text.starts_with("~450m a pied | 13:30 Station Leuven train"));
    }

    #[test]
    fn only_rail_without_platforms_needs_enrichment() {
        let route = transit_route();
        let rides: Vec<&Ride> = route
            .steps
            .iter()
            .filter_map(|s| match s {
                Step::Ride(r) => Some(r),
                Step::Walk { .. } => None,
            })
            .collect();
        assert!(rides[0].needs_platforms());
        assert!(!rides[1].needs_platforms());
    }

    #[tokio::test]
    async fn enrichment_fills_platforms() {
        let mut route = transit_route();
        let source = FixedSource(vec![TimedPlatforms {
            departure_time: DateTime::from_timestamp(1710509400 + 60, 0).unwrap(),
            platforms: Platforms {
                departure: Some("11".into()),
                arrival: Some("4".into()),
            },
        }]);

        route.enrich(&source).await;

        assert!(route.render(Language::Dutch).contains(
            "13:30 Station Leuven sp.11 trein (2 haltes) -> Brussel-Centraal sp.4 13:55"
        ));
    }

    #[tokio::test]
    async fn enrichment_out_of_tolerance_changes_nothing() {
        let mut route = transit_route();
        let before = route.clone();
        let source = FixedSource(vec![TimedPlatforms {
            departure_time: DateTime::from_timestamp(1710509400 + 300, 0).unwrap(),
            platforms: Platforms {
                departure: Some("11".into()),
                arrival: None,
            },
        }]);

        route.enrich(&source).await;
        assert_eq!(route, before);
    }

    #[test]
    fn route_without_rides() {
        let route: RouteRecord = serde_json::from_str(
            r#"{"legs": [{
                "departure_time": {"text": "10:00"},
                "arrival_time": {"text": "10:12"},
                "duration": {"value": 720},
                "steps": [{"travel_mode": "WALKING", "distance": {"value": 90}}]
            }]}"#,
        )
        .unwrap();
        let route = TransitRoute::from_record(route).unwrap();
        assert_eq!(route.render(Language::Dutch), "10:00 -> 10:12 (12min)");
    }

    #[test]
    fn render_walking_route() {
        let route: RouteRecord = serde_json::from_str(
            r#"{"legs": [{
                "distance": {"value": 1300},
                "duration": {"value": 960},
                "steps": [
                    {"html_instructions": "Ga naar het <b>noorden</b>", "distance": {"value": 300}},
                    {"html_instructions": "Sla rechtsaf", "distance": {"value": 15}},
                    {"html_instructions": "Sla <b>linksaf</b> naar <b>Vaartkom</b>", "distance": {"value": 935}}
                ]
            }]}"#,
        )
        .unwrap();
        let route = WalkingRoute::from_record(route).unwrap();
        assert_eq!(
            route.render(),
            "Ga naar het noorden (300m), Sla linksaf naar Vaartkom (935m) -- 1.3km, 16min"
        );
    }

    #[test]
    fn no_legs_means_no_route() {
        let route: RouteRecord = serde_json::from_str(r#"{"legs": []}"#).unwrap();
        assert!(TransitRoute::from_record(route).is_none());
    }
}
