//! HTTP routes for the dispatcher endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    list_sent_messages, sender_status, start_sender, stop_sender, MessageHandlers,
};

/// Creates the router for the control surface and the sent-message listing.
pub fn message_routes(handlers: MessageHandlers) -> Router {
    Router::new()
        .route("/start", post(start_sender))
        .route("/stop", post(stop_sender))
        .route("/status", get(sender_status))
        .route("/sent", get(list_sent_messages))
        .with_state(handlers)
}
