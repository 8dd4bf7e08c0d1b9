//! Inbound message record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::parse_local_timestamp;

/// A decoded text message from a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Sender address, usually a phone number
    pub sender: String,

    /// Message body
    pub text: String,

    /// Receive time as reported by the transport, local wall clock
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// The receive time, if the transport reported a readable one.
    pub fn received_at(&self) -> Option<NaiveDateTime> {
        self.timestamp.as_deref().and_then(parse_local_timestamp)
    }
}
