//! On-duty pharmacy lookup.
//!
//! The search page embeds each result card's data as HTML-escaped JSON in a
//! `data-pharmacy` attribute; that JSON is read directly.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::http::{DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS, LimitedClient};

use super::error::ServiceError;

const DEFAULT_SEARCH_URL: &str = "https://www.apotheek.be/PharmacySearch";

/// Pharmacies listed per reply.
pub const MAX_PHARMACIES: usize = 2;

static PHARMACY_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-pharmacy="([^"]*)""#).expect("valid regex"));

#[derive(Debug, Deserialize)]
struct PharmacyRecord {
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Address", default)]
    address: Option<String>,
    #[serde(rename = "Phone", default)]
    phone: Option<String>,
    #[serde(rename = "OnDuty", default)]
    on_duty: bool,
}

/// An on-duty pharmacy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pharmacy {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// Non-empty fields, one per line.
impl fmt::Display for Pharmacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<&str> = [&self.name, &self.address, &self.phone]
            .into_iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        f.write_str(&lines.join("\n"))
    }
}

impl PharmacyRecord {
    fn into_pharmacy(self) -> Option<Pharmacy> {
        let field = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
        let pharmacy = Pharmacy {
            name: field(self.name),
            address: field(self.address),
            phone: field(self.phone),
        };
        let empty = pharmacy.name.is_empty()
            && pharmacy.address.is_empty()
            && pharmacy.phone.is_empty();
        (!empty).then_some(pharmacy)
    }
}

/// On-duty pharmacies embedded in a search results page, at most `limit`.
///
/// Cards that fail to decode or are not on duty are skipped.
pub fn parse_pharmacies(html: &str, limit: usize) -> Vec<Pharmacy> {
    PHARMACY_ATTR
        .captures_iter(html)
        .filter_map(|caps| {
            let raw = caps.get(1)?.as_str();
            let json = quick_xml::escape::unescape(raw).ok()?;
            match serde_json::from_str::<PharmacyRecord>(&json) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable pharmacy card");
                    None
                }
            }
        })
        .filter(|record| record.on_duty)
        .filter_map(PharmacyRecord::into_pharmacy)
        .take(limit)
        .collect()
}

/// Pharmacies separated by `---` lines.
pub fn render_pharmacies(pharmacies: &[Pharmacy]) -> String {
    pharmacies
        .iter()
        .map(Pharmacy::to_string)
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Pharmacy search client.
#[derive(Debug, Clone)]
pub struct PharmacyClient {
    http: LimitedClient,
    search_url: String,
}

impl PharmacyClient {
    pub fn new() -> Result<Self, ServiceError> {
        Self::with_search_url(DEFAULT_SEARCH_URL)
    }

    pub fn with_search_url(url: impl Into<String>) -> Result<Self, ServiceError> {
        let http = LimitedClient::new(
            &[("user-agent", "Mozilla/5.0"), ("accept-language", "nl-BE")],
            DEFAULT_TIMEOUT_SECS,
            DEFAULT_MAX_CONCURRENT,
        )?;
        Ok(Self {
            http,
            search_url: url.into(),
        })
    }

    /// On-duty pharmacies near `query` (usually a postcode).
    pub async fn on_duty(&self, query: &str) -> Result<Vec<Pharmacy>, ServiceError> {
        let html = self
            .http
            .get_text(
                &self.search_url,
                &[("OnDutyTouched", "true"), ("Query", query), ("OnDuty", "true")],
            )
            .await?;
        let pharmacies = parse_pharmacies(&html, MAX_PHARMACIES);
        info!(query, found = pharmacies.len(), "On-duty pharmacies");
        Ok(pharmacies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="pharmacy-accordion-card" data-pharmacy="{&quot;Name&quot;:&quot;Apotheek Centrum&quot;,&quot;Address&quot;:&quot;Markt 1, 9790 Wortegem&quot;,&quot;Phone&quot;:&quot;09 123 45 67&quot;,&quot;OnDuty&quot;:true}">
<div class="pharmacy-accordion-card" data-pharmacy="{&quot;Name&quot;:&quot;Apotheek Dicht&quot;,&quot;OnDuty&quot;:false}">
<div class="pharmacy-accordion-card" data-pharmacy="not json">
<div class="pharmacy-accordion-card" data-pharmacy="{&quot;Name&quot;:&quot;Apotheek De Brug&quot;,&quot;Address&quot;:&quot;Brugstraat 5, 9790 Wortegem&quot;,&quot;OnDuty&quot;:true}">
<div class="pharmacy-accordion-card" data-pharmacy="{&quot;Name&quot;:&quot;Apotheek Derde&quot;,&quot;OnDuty&quot;:true}">
"#;

    #[test]
    fn on_duty_cards_only() {
        let pharmacies = parse_pharmacies(PAGE, MAX_PHARMACIES);
        let names: Vec<_> = pharmacies.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Apotheek Centrum", "Apotheek De Brug"]);
    }

    #[test]
    fn rendering_skips_missing_fields() {
        let pharmacies = parse_pharmacies(PAGE, MAX_PHARMACIES);
        assert_eq!(
            render_pharmacies(&pharmacies),
            "Apotheek Centrum\nMarkt 1, 9790 Wortegem\n09 123 45 67\n---\n\
             Apotheek De Brug\nBrugstraat 5, 9790 Wortegem"
        );
    }

    #[test]
    fn page_without_cards() {
        assert!(parse_pharmacies("<html></html>", MAX_PHARMACIES).is_empty());
    }
}
