//! HTTP adapter for the message dispatcher.
//!
//! - `POST /start`, `POST /stop`, `GET /status` control the dispatch loop
//! - `GET /sent` lists sent messages with cached provider data

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, RunningResponse, SentMessagesParams, StatusMessageResponse};
pub use handlers::MessageHandlers;
pub use routes::message_routes;
