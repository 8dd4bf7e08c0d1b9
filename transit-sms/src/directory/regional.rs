//! Regional bus directory (De Lijn open data).
//!
//! Stops are identified by an entity number plus a local stop number. Stop
//! search is paged; lines come from the line-directions endpoint, which
//! sometimes reports a line under a different entity than the stop's own.

use std::future::Future;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::{
    Departure, LineAtStop, LineKey, Provider, StopCandidate, StopId, parse_local_timestamp,
};
use crate::http::{DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS, LimitedClient, USER_AGENT};

use super::error::DirectoryError;
use super::wire::{id_string, opt_id_string};
use super::{StopDirectory, or_empty};

const DEFAULT_SEARCH_URL: &str = "https://api.delijn.be/DLZoekOpenData/v1";
const DEFAULT_CORE_URL: &str = "https://api.delijn.be/DLKernOpenData/api/v1";

/// Results per search page.
const DEFAULT_PAGE_SIZE: usize = 15;

/// Passages requested from the realtime endpoint.
const REALTIME_PASSAGES: usize = 12;

/// Configuration for the regional bus client.
#[derive(Debug, Clone)]
pub struct RegionalBusConfig {
    /// Subscription key
    pub api_key: String,
    /// Base URL of the search API
    pub search_url: String,
    /// Base URL of the core (stops/lines/passings) API
    pub core_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Results per search page
    pub page_size: usize,
}

impl RegionalBusConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            core_url: DEFAULT_CORE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    pub fn with_core_url(mut self, url: impl Into<String>) -> Self {
        self.core_url = url.into();
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

    pub fn with_page_size(mut self, n: usize) -> Self {
        self.page_size = n;
        self
    }
}

/// Regional bus API client.
#[derive(Debug, Clone)]
pub struct RegionalBusClient {
    http: LimitedClient,
    search_url: String,
    core_url: String,
    page_size: usize,
}

impl RegionalBusClient {
    pub fn new(config: RegionalBusConfig) -> Result<Self, DirectoryError> {
        let http = LimitedClient::new(
            &[
                ("ocp-apim-subscription-key", config.api_key.as_str()),
                ("cache-control", "no-cache"),
                ("accept", "application/json"),
                ("user-agent", USER_AGENT),
            ],
            config.timeout_secs,
            config.max_concurrent,
        )?;

        Ok(Self {
            http,
            search_url: config.search_url.trim_end_matches('/').to_string(),
            core_url: config.core_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
        })
    }

    /// One page of stop search results, with the provider's total hit count.
    pub async fn search_page(
        &self,
        name: &str,
        start: usize,
        max_hits: usize,
    ) -> Result<(usize, Vec<StopCandidate>), DirectoryError> {
        let url = format!(
            "{}/zoek/haltes/{}",
            self.search_url,
            urlencoding::encode(name)
        );
        let page: StopSearchPage = self
            .http
            .get_json(
                &url,
                &[
                    ("startIndex", start.to_string()),
                    ("maxAantalHits", max_hits.to_string()),
                ],
            )
            .await?;

        debug!(name, start, hits = page.haltes.len(), total = page.aantal_hits, "Search page");
        let total = page.aantal_hits;
        Ok((total, page.into_candidates(name)))
    }

    /// All search results up to `cap`, fetched page by page.
    pub async fn search_all(
        &self,
        name: &str,
        cap: usize,
    ) -> Result<Vec<StopCandidate>, DirectoryError> {
        collect_pages(cap, self.page_size, |start, size| {
            self.search_page(name, start, size)
        })
        .await
    }

    /// Lines serving a stop, per the line-directions endpoint.
    pub async fn line_directions(
        &self,
        stop: &StopCandidate,
    ) -> Result<Vec<LineAtStop>, DirectoryError> {
        let (scope, number) = scoped_parts(stop)?;
        let url = format!("{}/haltes/{scope}/{number}/lijnrichtingen", self.core_url);
        let directions: LineDirections = self.http.get_json(&url, &[] as &[(&str, &str)]).await?;
        Ok(directions.into_lines())
    }

    /// Realtime passings at a stop.
    pub async fn realtime(&self, stop: &StopCandidate) -> Result<Vec<Departure>, DirectoryError> {
        let (scope, number) = scoped_parts(stop)?;
        let url = format!("{}/haltes/{scope}/{number}/real-time", self.core_url);
        let page: PassingsPage = self
            .http
            .get_json(&url, &[("maxAantalDoorkomsten", REALTIME_PASSAGES.to_string())])
            .await?;
        Ok(page.into_departures())
    }

    /// Timetabled passings at a stop.
    pub async fn timetable(&self, stop: &StopCandidate) -> Result<Vec<Departure>, DirectoryError> {
        let (scope, number) = scoped_parts(stop)?;
        let url = format!("{}/haltes/{scope}/{number}/dienstregelingen", self.core_url);
        let page: PassingsPage = self.http.get_json(&url, &[] as &[(&str, &str)]).await?;
        Ok(page.into_departures())
    }
}

impl StopDirectory for RegionalBusClient {
    fn provider(&self) -> Provider {
        Provider::RegionalBus
    }

    async fn search_stops(&self, name: &str, max_results: usize) -> Vec<StopCandidate> {
        let stops = or_empty(
            self.search_all(name, max_results).await,
            self.provider(),
            "search_stops",
        );
        info!(query = name, count = stops.len(), "Stop search");
        stops
    }

    async fn lines_at(&self, stop: &StopCandidate) -> Vec<LineAtStop> {
        or_empty(self.line_directions(stop).await, self.provider(), "lines_at")
    }

    async fn realtime_departures(&self, stop: &StopCandidate) -> Vec<Departure> {
        or_empty(self.realtime(stop).await, self.provider(), "realtime")
    }

    async fn scheduled_departures(&self, stop: &StopCandidate) -> Vec<Departure> {
        or_empty(self.timetable(stop).await, self.provider(), "timetable")
    }

    /// The line as reported, plus the same line under the stop's own entity.
    fn line_keys(&self, stop: &StopCandidate, line: &LineAtStop) -> Vec<LineKey> {
        let mut keys = vec![line.key()];
        if let Some(scope) = stop.id.scope() {
            let relaxed = LineKey::scoped(scope, &line.line);
            if !keys.contains(&relaxed) {
                keys.push(relaxed);
            }
        }
        keys
    }
}

fn scoped_parts(stop: &StopCandidate) -> Result<(&str, &str), DirectoryError> {
    match &stop.id {
        StopId::Scoped { scope, number } if stop.provider == Provider::RegionalBus => {
            Ok((scope, number))
        }
        _ => Err(DirectoryError::ForeignStop {
            provider: Provider::RegionalBus,
            id: stop.id.clone(),
        }),
    }
}

/// Fetch pages of `page_size` until the provider's total or `cap` is
/// reached.
///
/// A failing first page is an error; a failing later page ends paging with
/// what was collected so far.
async fn collect_pages<F, Fut>(
    cap: usize,
    page_size: usize,
    mut fetch: F,
) -> Result<Vec<StopCandidate>, DirectoryError>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<(usize, Vec<StopCandidate>), DirectoryError>>,
{
    if cap == 0 {
        return Ok(Vec::new());
    }
    let page_size = page_size.max(1);

    let (total, mut all) = fetch(0, page_size.min(cap)).await?;

    while all.len() < total && all.len() < cap {
        let start = all.len();
        match fetch(start, page_size.min(cap - start)).await {
            Ok((_, page)) if !page.is_empty() => all.extend(page),
            Ok(_) => break,
            Err(e) => {
                warn!(start, error = %e, "Search page failed, keeping earlier pages");
                break;
            }
        }
    }

    all.truncate(cap);
    Ok(all)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StopSearchPage {
    #[serde(default)]
    aantal_hits: usize,
    #[serde(default)]
    haltes: Vec<StopRecord>,
}

impl StopSearchPage {
    fn into_candidates(self, query: &str) -> Vec<StopCandidate> {
        self.haltes
            .iter()
            .filter_map(|record| {
                let candidate = record.to_candidate(query);
                if candidate.is_none() {
                    warn!(query, ?record, "Skipping stop record without an id");
                }
                candidate
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct StopRecord {
    #[serde(default, deserialize_with = "opt_id_string")]
    entiteitnummer: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    haltenummer: Option<String>,
    #[serde(default)]
    omschrijving: Option<String>,
}

impl StopRecord {
    /// `None` when either half of the scoped id is missing.
    fn to_candidate(&self, query: &str) -> Option<StopCandidate> {
        let (Some(scope), Some(number)) = (&self.entiteitnummer, &self.haltenummer) else {
            return None;
        };
        Some(StopCandidate::new(
            Provider::RegionalBus,
            StopId::scoped(scope.clone(), number.clone()),
            self.omschrijving.clone().unwrap_or_else(|| query.to_string()),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct LineDirections {
    #[serde(default)]
    lijnrichtingen: Vec<LineDirectionRecord>,
}

#[derive(Debug, Deserialize)]
struct LineDirectionRecord {
    #[serde(default, deserialize_with = "opt_id_string")]
    entiteitnummer: Option<String>,
    #[serde(deserialize_with = "id_string")]
    lijnnummer: String,
}

impl LineDirections {
    fn into_lines(self) -> Vec<LineAtStop> {
        self.lijnrichtingen
            .into_iter()
            .map(|r| LineAtStop::new(r.entiteitnummer, r.lijnnummer))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct PassingsPage {
    #[serde(default, rename = "halteDoorkomsten")]
    stops: Vec<StopPassings>,
}

#[derive(Debug, Deserialize)]
struct StopPassings {
    #[serde(default)]
    doorkomsten: Vec<PassingRecord>,
}

#[derive(Debug, Deserialize)]
struct PassingRecord {
    #[serde(default, deserialize_with = "opt_id_string")]
    lijnnummer: Option<String>,
    #[serde(default)]
    bestemming: Option<String>,
    #[serde(default, rename = "bestemmingKort")]
    bestemming_kort: Option<String>,
    #[serde(default, rename = "dienstregelingTijdstip")]
    scheduled: Option<String>,
    #[serde(default, rename = "real-timeTijdstip")]
    realtime: Option<String>,
}

impl PassingsPage {
    fn into_departures(self) -> Vec<Departure> {
        self.stops
            .into_iter()
            .flat_map(|s| s.doorkomsten)
            .map(PassingRecord::into_departure)
            .collect()
    }
}

impl PassingRecord {
    fn into_departure(self) -> Departure {
        let destination = self
            .bestemming
            .or(self.bestemming_kort)
            .unwrap_or_else(|| "?".to_string());
        Departure {
            line: self.lijnnummer.unwrap_or_else(|| "?".to_string()),
            destination,
            scheduled: self.scheduled.as_deref().and_then(parse_local_timestamp),
            realtime: self.realtime.as_deref().and_then(parse_local_timestamp),
            platform: None,
        }
    }
}
