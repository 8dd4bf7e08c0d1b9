//! Rail network connections.
//!
//! Serves the `trein` command and is the platform-authoritative source for
//! enriching rail legs of directions.
//!
//! Key characteristics of the API:
//! - times are unix timestamps, delays are seconds, both sent as strings
//! - the departure time reported is the scheduled one; delay is separate
//! - platforms live in `platforminfo.name`

mod client;
mod connection;
mod convert;
mod error;
mod types;

pub use client::{RailClient, RailConfig};
pub use connection::{RailConnection, RailEvent, RailVia};
pub use error::RailError;
