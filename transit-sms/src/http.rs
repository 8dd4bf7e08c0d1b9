//! Shared HTTP plumbing for the provider clients.
//!
//! Every client builds its own `reqwest::Client` with default headers and a
//! timeout, and bounds its in-flight requests with a semaphore. The status
//! and decoding rules below are common to all of them.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::{Semaphore, SemaphorePermit};

/// User agent sent to every provider.
pub const USER_AGENT: &str = concat!("transit-sms/", env!("CARGO_PKG_VERSION"));

/// Default request timeout for provider calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default cap on concurrent requests per client.
pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// How much of an unparseable body to keep for diagnostics.
const BODY_SNIPPET_CHARS: usize = 500;

/// A failed round trip.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unauthorized (invalid API key)")]
    Unauthorized,

    #[error("rate limited")]
    RateLimited,

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("client shut down")]
    Closed,
}

/// A `reqwest` client plus its concurrency limit.
#[derive(Debug, Clone)]
pub struct LimitedClient {
    http: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl LimitedClient {
    /// Build a client sending `headers` on every request.
    pub fn new(
        headers: &[(&'static str, &str)],
        timeout_secs: u64,
        max_concurrent: usize,
    ) -> Result<Self, HttpError> {
        let mut map = HeaderMap::new();
        for &(name, value) in headers {
            let value = HeaderValue::from_str(value).map_err(|_| HttpError::InvalidHeader(name))?;
            map.insert(HeaderName::from_static(name), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(map)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        })
    }

    /// Wait for a request slot.
    pub async fn permit(&self) -> Result<SemaphorePermit<'_>, HttpError> {
        self.semaphore.acquire().await.map_err(|_| HttpError::Closed)
    }

    /// GET `url` and return the body text.
    pub async fn get_text<Q: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        query: &Q,
    ) -> Result<String, HttpError> {
        let _permit = self.permit().await?;
        let response = self.http.get(url).query(query).send().await?;
        read_body(response).await
    }

    /// GET `url` and decode a JSON body.
    pub async fn get_json<T, Q>(&self, url: &str, query: &Q) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let body = self.get_text(url, query).await?;
        decode_json(&body)
    }

    /// POST a JSON payload and decode a JSON reply.
    pub async fn post_json<T, B>(&self, url: &str, payload: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let _permit = self.permit().await?;
        let response = self.http.post(url).json(payload).send().await?;
        let body = read_body(response).await?;
        decode_json(&body)
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, HttpError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(HttpError::Unauthorized);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(HttpError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpError::Status {
            status: status.as_u16(),
            message: body.chars().take(BODY_SNIPPET_CHARS).collect(),
        });
    }

    Ok(response.text().await?)
}

/// Decode a JSON body, keeping a snippet of it on failure.
pub fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, HttpError> {
    serde_json::from_str(body).map_err(|e| HttpError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(BODY_SNIPPET_CHARS).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Sample {
        value: u32,
    }

    #[test]
    fn decode_keeps_body_snippet() {
        let err = decode_json::<Sample>("{\"value\": \"nope\"}").unwrap_err();
        match err {
            HttpError::Json { message, body } => {
                assert!(message.contains("invalid type"));
                assert_eq!(body.as_deref(), Some("{\"value\": \"nope\"}"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decode_ok() {
        let sample: Sample = decode_json("{\"value\": 7}").unwrap();
        assert_eq!(sample.value, 7);
    }

    #[test]
    fn error_display() {
        let err = HttpError::Status {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");
        assert_eq!(HttpError::Unauthorized.to_string(), "unauthorized (invalid API key)");
    }

    #[test]
    fn rejects_bad_header_value() {
        let err = LimitedClient::new(&[("x-apikey", "bad\nkey")], 5, 1).unwrap_err();
        assert!(matches!(err, HttpError::InvalidHeader("x-apikey")));
    }

    #[test]
    fn client_creation() {
        assert!(LimitedClient::new(&[("accept", "application/json")], 5, 4).is_ok());
    }
}
