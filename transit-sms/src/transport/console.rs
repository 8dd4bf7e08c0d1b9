//! Terminal transport for local use.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::handler::Handler;

use super::message::InboundMessage;
use super::respond_isolated;

/// Sender used when the prompt is left empty.
pub const DEFAULT_SENDER: &str = "+32400000000";

/// Read sender and message pairs from stdin until end of input, printing
/// each reply.
pub async fn run_console(handler: Arc<Handler>) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    info!("Console transport ready");

    loop {
        stdout.write_all(b"\n  Sender (+32...): ").await?;
        stdout.flush().await?;
        let Some(sender) = lines.next_line().await? else {
            break;
        };

        stdout.write_all(b"  Message       : ").await?;
        stdout.flush().await?;
        let Some(text) = lines.next_line().await? else {
            break;
        };

        let sender = match sender.trim() {
            "" => DEFAULT_SENDER,
            s => s,
        };
        let message = InboundMessage::new(sender, text.trim());
        let reply = respond_isolated(Arc::clone(&handler), message).await;

        stdout.write_all(b"\n").await?;
        stdout.write_all(frame_reply(sender, &reply).as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("Console input closed");
    Ok(())
}

/// A reply boxed for the terminal, with its character count.
pub fn frame_reply(recipient: &str, text: &str) -> String {
    let mut out = format!("  ┌─ Reply to {recipient}\n");
    for line in text.lines() {
        out.push_str(&format!("  │  {line}\n"));
    }
    out.push_str(&format!("  └─ ({} chars)\n", text.chars().count()));
    out
}
