//! Route resolution against a stop directory.
//!
//! Turns a pair of free-text stop names into the next departures on direct
//! lines between them, or a single stop name into a departure board.

mod board;
mod config;
mod index;
mod rank;
mod resolve;

pub use board::{BoardOutcome, stop_board};
pub use config::ResolverConfig;
pub use rank::rank_rows;
pub use resolve::{RouteOutcome, RouteResolver};
