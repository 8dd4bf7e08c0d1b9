//! Canonical station names.
//!
//! The index is loaded once at startup from a plain-text list (one name per
//! line, `#` comments) and is read-only afterwards. Source order is
//! significant: it breaks ties between equally good matches.

mod error;
mod names;

pub use error::StationError;
pub use names::{CanonicalName, KEY_SEPARATOR, StationIndex, station_key};
