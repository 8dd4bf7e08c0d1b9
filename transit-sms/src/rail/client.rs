//! HTTP client for the rail network's connections endpoint.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use crate::enrich::{PlatformSource, TimedPlatforms};
use crate::http::{DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS, LimitedClient, USER_AGENT};

use super::connection::RailConnection;
use super::error::RailError;
use super::types::ConnectionsResponse;

const DEFAULT_BASE_URL: &str = "https://api.irail.be";

/// Connections requested when looking up platforms.
const PLATFORM_CANDIDATES: usize = 6;

/// Configuration for the rail client.
#[derive(Debug, Clone)]
pub struct RailConfig {
    /// Base URL of the API
    pub base_url: String,
    /// Language of station names
    pub lang: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RailConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: "nl".to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
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

impl Default for RailConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Rail connections client. Needs no credentials.
#[derive(Debug, Clone)]
pub struct RailClient {
    http: LimitedClient,
    base_url: String,
    lang: String,
}

impl RailClient {
    pub fn new(config: RailConfig) -> Result<Self, RailError> {
        let http = LimitedClient::new(
            &[("accept", "application/json"), ("user-agent", USER_AGENT)],
            config.timeout_secs,
            config.max_concurrent,
        )?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            lang: config.lang,
        })
    }

    /// Train connections from `from` to `to` departing at or after `at`
    /// (local time), at most `results` of them.
    ///
    /// Connections that fail to convert are skipped.
    pub async fn connections(
        &self,
        from: &str,
        to: &str,
        at: NaiveDateTime,
        results: usize,
    ) -> Result<Vec<RailConnection>, RailError> {
        let url = format!("{}/connections/", self.base_url);
        let query = connections_query(from, to, at, results, &self.lang);
        let response: ConnectionsResponse = self.http.get_json(&url, &query).await?;

        let total = response.connection.len();
        let connections: Vec<RailConnection> = response
            .connection
            .into_iter()
            .filter_map(|record| match RailConnection::try_from(record) {
                Ok(conn) => Some(conn),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable connection");
                    None
                }
            })
            .collect();

        info!(from, to, total, kept = connections.len(), "Rail connections");
        Ok(connections)
    }
}

impl PlatformSource for RailClient {
    async fn connections_near(
        &self,
        from: &str,
        to: &str,
        at: DateTime<Utc>,
    ) -> Vec<TimedPlatforms> {
        let local = at.with_timezone(&Local).naive_local();
        match self.connections(from, to, local, PLATFORM_CANDIDATES).await {
            Ok(conns) => conns.iter().map(RailConnection::timed_platforms).collect(),
            Err(e) => {
                warn!(from, to, error = %e, "Platform lookup failed");
                Vec::new()
            }
        }
    }
}

fn connections_query(
    from: &str,
    to: &str,
    at: NaiveDateTime,
    results: usize,
    lang: &str,
) -> Vec<(&'static str, String)> {
    let query = vec![
        ("from", from.to_string()),
        ("to", to.to_string()),
        ("date", at.format("%d%m%y").to_string()),
        ("time", at.format("%H%M").to_string()),
        ("timesel", "departure".to_string()),
        ("format", "json".to_string()),
        ("lang", lang.to_string()),
        ("results", results.to_string()),
        ("typeOfTransport", "trains".to_string()),
    ];
    debug!(?query, "Connections query");
    query
}
