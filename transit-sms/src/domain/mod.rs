//! Domain types for stop lookup and route answers.
//!
//! These are the provider-neutral shapes every directory client converts
//! into. They live only for the duration of one request.

mod departure;
mod itinerary;
mod stop;
mod text;
mod time;

pub use departure::{Departure, LineAtStop, LineKey};
pub use itinerary::ItineraryLine;
pub use stop::{Provider, StopCandidate, StopId};
pub use text::{ELLIPSIS, truncate};
pub use time::{
    TimeError, at_clock, delay_suffix, hhmm, is_clock_token, parse_clock, parse_local_timestamp,
    truncate_to_minute,
};
