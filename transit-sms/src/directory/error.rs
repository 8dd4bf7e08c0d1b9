//! Stop directory error types.

use crate::domain::{Provider, StopId};
use crate::http::HttpError;

/// Errors from a stop directory client.
///
/// These never reach the route resolver; the [`StopDirectory`] surface logs
/// them and reports empty data instead.
///
/// [`StopDirectory`]: super::StopDirectory
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The stop id belongs to a different provider's id scheme.
    #[error("{provider} cannot query stop {id}")]
    ForeignStop { provider: Provider, id: StopId },

    /// A record lacked a field the conversion needs.
    #[error("malformed record: {0}")]
    Malformed(String),
}
