//! Collaborator error types.

use crate::http::HttpError;

/// Errors from the thin external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Feed or page markup could not be read
    #[error("XML error: {0}")]
    Xml(String),

    /// The completion endpoint returned no choices
    #[error("empty completion")]
    EmptyCompletion,

    /// A response lacked a field the reply needs
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl From<quick_xml::Error> for ServiceError {
    fn from(err: quick_xml::Error) -> Self {
        ServiceError::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(ServiceError::EmptyCompletion.to_string(), "empty completion");
        assert_eq!(
            ServiceError::Malformed("no forecast day".into()).to_string(),
            "unexpected response: no forecast day"
        );
        assert_eq!(
            ServiceError::from(HttpError::Unauthorized).to_string(),
            "unauthorized (invalid API key)"
        );
    }
}
