//! City transit directory (STIB/MIVB open data).
//!
//! Served from an opendatasoft catalog: one dataset for stop details and one
//! for realtime waiting times. Stops have a single point id. There is no
//! schedule source, and lines serving a stop are derived from its waiting
//! times.

use serde::Deserialize;
use tracing::info;

use crate::domain::{Departure, LineAtStop, Provider, StopCandidate, StopId, parse_local_timestamp};
use crate::http::{
    DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS, LimitedClient, USER_AGENT, decode_json,
};

use super::error::DirectoryError;
use super::wire::id_string;
use super::{StopDirectory, or_empty};

const DEFAULT_BASE_URL: &str =
    "https://stibmivb.opendatasoft.com/api/explore/v2.1/catalog/datasets";

const STOPS_DATASET: &str = "stop-details-production";
const WAITING_DATASET: &str = "waiting-time-rt-production";

/// Largest `limit` the catalog accepts.
const MAX_RECORDS: usize = 100;

/// Configuration for the city transit client.
#[derive(Debug, Clone)]
pub struct CityTransitConfig {
    /// API key, sent as a query parameter
    pub api_key: String,
    /// Catalog base URL
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CityTransitConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
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

/// City transit API client.
#[derive(Debug, Clone)]
pub struct CityTransitClient {
    http: LimitedClient,
    base_url: String,
    api_key: String,
}

impl CityTransitClient {
    pub fn new(config: CityTransitConfig) -> Result<Self, DirectoryError> {
        let http = LimitedClient::new(
            &[("accept", "application/json"), ("user-agent", USER_AGENT)],
            config.timeout_secs,
            config.max_concurrent,
        )?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    async fn records<T: serde::de::DeserializeOwned>(
        &self,
        dataset: &str,
        filter: String,
        limit: usize,
    ) -> Result<Vec<T>, DirectoryError> {
        let url = format!("{}/{dataset}/records", self.base_url);
        let page: Records<T> = self
            .http
            .get_json(
                &url,
                &[
                    ("where", filter),
                    ("limit", limit.clamp(1, MAX_RECORDS).to_string()),
                    ("apikey", self.api_key.clone()),
                ],
            )
            .await?;
        Ok(page.results)
    }

    /// Stops whose name contains `name` (either language).
    pub async fn search(&self, name: &str, limit: usize) -> Result<Vec<StopCandidate>, DirectoryError> {
        let records: Vec<StopRecord> = self
            .records(STOPS_DATASET, name_filter(name), limit)
            .await?;
        Ok(records
            .into_iter()
            .map(|r| r.into_candidate(name))
            .collect())
    }

    /// Realtime waiting times at a stop.
    pub async fn waiting_times(&self, stop: &StopCandidate) -> Result<Vec<Departure>, DirectoryError> {
        let point = point_id(stop)?;
        let records: Vec<WaitingRecord> = self
            .records(WAITING_DATASET, format!("pointid=\"{}\"", quote(point)), 1)
            .await?;

        let mut departures = Vec::new();
        for record in records {
            departures.extend(record.passing_times()?.into_iter().map(PassingTime::into_departure));
        }
        Ok(departures)
    }
}

impl StopDirectory for CityTransitClient {
    fn provider(&self) -> Provider {
        Provider::CityTransit
    }

    async fn search_stops(&self, name: &str, max_results: usize) -> Vec<StopCandidate> {
        let stops = or_empty(
            self.search(name, max_results).await,
            self.provider(),
            "search_stops",
        );
        info!(query = name, count = stops.len(), "Stop search");
        stops
    }

    async fn lines_at(&self, stop: &StopCandidate) -> Vec<LineAtStop> {
        let departures = or_empty(self.waiting_times(stop).await, self.provider(), "lines_at");
        lines_from_departures(&departures)
    }

    async fn realtime_departures(&self, stop: &StopCandidate) -> Vec<Departure> {
        or_empty(self.waiting_times(stop).await, self.provider(), "waiting_times")
    }
}

/// Distinct lines in first-seen order.
fn lines_from_departures(departures: &[Departure]) -> Vec<LineAtStop> {
    let mut lines: Vec<LineAtStop> = Vec::new();
    for departure in departures {
        if departure.line.is_empty() || lines.iter().any(|l| l.line == departure.line) {
            continue;
        }
        lines.push(LineAtStop::new(None, departure.line.clone()));
    }
    lines
}

fn point_id(stop: &StopCandidate) -> Result<&str, DirectoryError> {
    match &stop.id {
        StopId::Compound(id) if stop.provider == Provider::CityTransit => Ok(id),
        _ => Err(DirectoryError::ForeignStop {
            provider: Provider::CityTransit,
            id: stop.id.clone(),
        }),
    }
}

/// Stop names are stored upper case in both languages.
fn name_filter(name: &str) -> String {
    format!("name like \"%{}%\"", quote(&name.trim().to_uppercase()))
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Deserialize)]
struct Records<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

/// A bilingual label.
#[derive(Debug, Clone, Default, Deserialize)]
struct Localized {
    #[serde(default)]
    nl: Option<String>,
    #[serde(default)]
    fr: Option<String>,
}

impl Localized {
    fn preferred(&self) -> Option<&str> {
        self.nl.as_deref().or(self.fr.as_deref())
    }
}

/// Labels arrive either as an object or as a JSON-encoded string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Label {
    Localized(Localized),
    Text(String),
}

impl Label {
    fn display(&self) -> Option<String> {
        match self {
            Label::Localized(l) => l.preferred().map(str::to_string),
            Label::Text(text) => match serde_json::from_str::<Localized>(text) {
                Ok(l) => l.preferred().map(str::to_string),
                Err(_) => Some(text.clone()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct StopRecord {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(default)]
    name: Option<Label>,
}

impl StopRecord {
    fn into_candidate(self, query: &str) -> StopCandidate {
        let name = self
            .name
            .as_ref()
            .and_then(Label::display)
            .unwrap_or_else(|| query.to_string());
        StopCandidate::new(Provider::CityTransit, StopId::compound(self.id), name)
    }
}

/// Passing times arrive either as an array or as a JSON-encoded string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PassingTimes {
    List(Vec<PassingTime>),
    Encoded(String),
}

#[derive(Debug, Deserialize)]
struct WaitingRecord {
    #[serde(default)]
    passingtimes: Option<PassingTimes>,
}

impl WaitingRecord {
    fn passing_times(self) -> Result<Vec<PassingTime>, DirectoryError> {
        match self.passingtimes {
            None => Ok(Vec::new()),
            Some(PassingTimes::List(list)) => Ok(list),
            Some(PassingTimes::Encoded(text)) => {
                decode_json(&text).map_err(|e| DirectoryError::Malformed(e.to_string()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PassingTime {
    #[serde(default, deserialize_with = "super::wire::opt_id_string")]
    line_id: Option<String>,
    #[serde(default)]
    destination: Option<Localized>,
    #[serde(default)]
    expected_arrival_time: Option<String>,
    #[serde(default)]
    aimed_arrival_time: Option<String>,
}

impl PassingTime {
    fn into_departure(self) -> Departure {
        let destination = self
            .destination
            .as_ref()
            .and_then(Localized::preferred)
            .unwrap_or("?")
            .to_string();
        Departure {
            line: self.line_id.unwrap_or_default(),
            destination,
            scheduled: self
                .aimed_arrival_time
                .as_deref()
                .and_then(parse_local_timestamp),
            realtime: self
                .expected_arrival_time
                .as_deref()
                .and_then(parse_local_timestamp),
            platform: None,
        }
    }
}
