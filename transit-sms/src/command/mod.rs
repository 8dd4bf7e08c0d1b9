//! Command recognition.
//!
//! Turns a raw message into an [`Intent`]. Every input yields a record; there
//! is no error path out of the parser.

mod grammar;
mod intent;
mod parser;

pub use grammar::{PLATFORM_KEYWORDS, TRANSIT_TRIGGERS, TransitTrigger, split_time_suffix};
pub use intent::{
    Command, DirectionsQuery, Intent, Language, StopQuery, TrainQuery, TransitMode, TravelMode,
};
pub use parser::CommandParser;
