//! Directions client error types.

use crate::http::HttpError;

/// Errors from the geocoding and directions client.
#[derive(Debug, thiserror::Error)]
pub enum DirectionsError {
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The API answered with a non-OK status
    #[error("directions API status {status}: {message}")]
    Api { status: String, message: String },
}
