//! Message transports.
//!
//! A transport delivers [`InboundMessage`]s to the [`Handler`] and returns
//! its replies. Each message runs in its own task; a panic inside one is
//! logged and answered with the generic failure reply.

mod console;
mod message;
mod web;

pub use console::{DEFAULT_SENDER, frame_reply, run_console};
pub use message::InboundMessage;
pub use web::{AppError, AppState, ReplyResponse, create_router, serve};

use std::sync::Arc;

use tracing::error;

use crate::handler::{FAILURE_REPLY, Handler};

/// Answer `message` on a separate task.
pub async fn respond_isolated(handler: Arc<Handler>, message: InboundMessage) -> String {
    let sender = message.sender.clone();
    match tokio::spawn(async move { handler.respond(&message).await }).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(%sender, error = %e, "Message task failed");
            FAILURE_REPLY.to_string()
        }
    }
}
