//! SMS assistant for Belgian public transport.
//!
//! Answers short text commands: "when does the next bus from here go
//! there?", train connections, directions, and a few everyday lookups.

pub mod command;
pub mod config;
pub mod directions;
pub mod directory;
pub mod domain;
pub mod enrich;
pub mod handler;
pub mod http;
pub mod matcher;
pub mod normalize;
pub mod rail;
pub mod resolver;
pub mod services;
pub mod stations;
pub mod transport;
