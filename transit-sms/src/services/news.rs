//! News headlines from RSS feeds.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::{info, warn};

use crate::domain::truncate;
use crate::http::{DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS, LimitedClient};

use super::error::ServiceError;

/// Feeds tried in order until one yields items.
pub const DEFAULT_FEEDS: [&str; 2] = [
    "https://www.vrt.be/vrtnws/nl.rss.articles.xml",
    "https://www.demorgen.be/rss.xml",
];

/// Headlines per reply.
pub const HEADLINES: usize = 3;

/// Longest headline kept, in characters.
const MAX_TITLE_CHARS: usize = 100;

/// Some feeds reject non-browser agents.
const BROWSER_AGENT: &str = "Mozilla/5.0";

/// Item titles of an RSS document, at most `limit`.
pub fn parse_titles(xml: &str, limit: usize) -> Result<Vec<String>, ServiceError> {
    let mut reader = Reader::from_str(xml);
    let mut titles = Vec::new();
    let mut in_item = false;
    let mut title: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) if e.name().as_ref() == b"item" => in_item = true,
            Event::Start(ref e) if in_item && e.name().as_ref() == b"title" => {
                title = Some(String::new());
            }
            Event::Text(ref e) => {
                if let Some(t) = title.as_mut() {
                    t.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(t) = title.as_mut() {
                    t.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"title" => {
                if let Some(t) = title.take() {
                    let t = t.trim();
                    if !t.is_empty() {
                        titles.push(truncate(t, MAX_TITLE_CHARS));
                    }
                }
            }
            Event::End(ref e) if e.name().as_ref() == b"item" => {
                in_item = false;
                if titles.len() >= limit {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    titles.truncate(limit);
    Ok(titles)
}

/// Numbered list, one headline per line.
pub fn render_headlines(titles: &[String]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {t}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// RSS headline client.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: LimitedClient,
    feeds: Vec<String>,
}

impl NewsClient {
    pub fn new() -> Result<Self, ServiceError> {
        Self::with_feeds(DEFAULT_FEEDS.iter().map(|f| f.to_string()).collect())
    }

    pub fn with_feeds(feeds: Vec<String>) -> Result<Self, ServiceError> {
        let http = LimitedClient::new(
            &[("user-agent", BROWSER_AGENT)],
            DEFAULT_TIMEOUT_SECS,
            DEFAULT_MAX_CONCURRENT,
        )?;
        Ok(Self { http, feeds })
    }

    /// Headlines from the first feed that has any. Empty when every feed
    /// failed or was empty.
    pub async fn headlines(&self, limit: usize) -> Vec<String> {
        for feed in &self.feeds {
            let titles = match self.http.get_text(feed, &[] as &[(&str, &str)]).await {
                Ok(body) => parse_titles(&body, limit),
                Err(e) => Err(e.into()),
            };
            match titles {
                Ok(titles) if !titles.is_empty() => {
                    info!(feed, count = titles.len(), "Headlines");
                    return titles;
                }
                Ok(_) => info!(feed, "Feed has no items"),
                Err(e) => warn!(feed, error = %e, "Feed failed"),
            }
        }
        Vec::new()
    }
}
