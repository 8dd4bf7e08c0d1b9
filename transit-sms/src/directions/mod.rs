//! Walking and public-transport directions.
//!
//! Both places are geocoded first; the directions result is rendered into
//! compact reply rows. Rail rides the provider returns without platforms are
//! enriched from the rail network.

mod client;
mod error;
mod route;
mod types;

pub use client::{DirectionsClient, DirectionsConfig, DirectionsOutcome};
pub use error::DirectionsError;
pub use route::{Ride, Step, TransitRoute, WalkingRoute, format_distance, format_duration};
pub use types::LatLng;
