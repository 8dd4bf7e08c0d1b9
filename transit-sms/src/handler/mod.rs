//! Message handling: intent to collaborator to reply.
//!
//! Key characteristics:
//! - every message gets a reply, failures included
//! - replies are cut to the command's budget with a trailing `…`
//! - collaborator failures are logged with detail and answered generically

mod actions;
mod error;
mod help;

pub use actions::{Collaborators, FAILURE_REPLY, Handler, answer_stops, render_connections};
pub use error::HandlerError;
pub use help::{UNKNOWN_REPLY, help_text};
