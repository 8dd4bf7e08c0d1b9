//! Rail client error types.

use crate::http::HttpError;

/// Errors from the rail connections client.
#[derive(Debug, thiserror::Error)]
pub enum RailError {
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A timestamp outside the representable range
    #[error("invalid unix time {0}")]
    InvalidTime(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(RailError::InvalidTime(-1).to_string(), "invalid unix time -1");

        let err = RailError::from(HttpError::RateLimited);
        assert_eq!(err.to_string(), "rate limited");
    }
}
