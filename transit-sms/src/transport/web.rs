//! HTTP transport.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::handler::Handler;

use super::message::InboundMessage;
use super::respond_isolated;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<Handler>,
}

impl AppState {
    pub fn new(handler: Handler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

/// Reply to a posted message.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/message", post(post_message))
        .with_state(state)
}

/// Bind `addr` and serve until the listener fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP transport listening");
    info!("  GET  /health   - Health check");
    info!("  POST /message  - Answer a message");
    axum::serve(listener, create_router(state)).await
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn post_message(
    State(state): State<AppState>,
    Json(message): Json<InboundMessage>,
) -> Result<Json<ReplyResponse>, AppError> {
    if message.sender.trim().is_empty() {
        return Err(AppError::BadRequest {
            message: "sender is required".into(),
        });
    }
    let reply = respond_isolated(Arc::clone(&state.handler), message).await;
    Ok(Json(ReplyResponse { reply }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };
        warn!(%status, error = %message, "Request rejected");
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandParser;
    use crate::config::Credentials;
    use crate::handler::{Collaborators, UNKNOWN_REPLY};
    use crate::stations::StationIndex;

    fn state() -> AppState {
        let parser = CommandParser::new(Arc::new(StationIndex::from_names(["Leuven"])));
        let services = Collaborators::from_credentials(&Credentials::default()).unwrap();
        AppState::new(Handler::new(parser, services))
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn message_gets_reply() {
        let message = InboundMessage::new("+32470000000", "hallo");
        let Json(response) = post_message(State(state()), Json(message)).await.unwrap();
        assert_eq!(response.reply, UNKNOWN_REPLY);
    }

    #[tokio::test]
    async fn blank_sender_rejected() {
        let message = InboundMessage::new("  ", "nieuws");
        let result = post_message(State(state()), Json(message)).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[test]
    fn router_builds() {
        let _router = create_router(state());
    }
}
