//! Handler error types.

use crate::directions::DirectionsError;
use crate::directory::DirectoryError;
use crate::rail::RailError;
use crate::services::ServiceError;

/// Errors escaping an action or raised while wiring the collaborators.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("rail: {0}")]
    Rail(#[from] RailError),

    #[error("directory: {0}")]
    Directory(#[from] DirectoryError),

    #[error("directions: {0}")]
    Directions(#[from] DirectionsError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
