//! HTTP adapters - REST API for the message dispatcher.

pub mod messages;

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use messages::{message_routes, MessageHandlers};

/// Builds the application router with request tracing and a request timeout.
pub fn api_router(handlers: MessageHandlers, request_timeout: Duration) -> Router {
    message_routes(handlers)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
