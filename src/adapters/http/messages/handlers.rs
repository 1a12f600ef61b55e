//! HTTP handlers for the dispatcher control surface and sent-message listing.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{ListSentMessagesHandler, ListSentMessagesQuery, MessageDispatcher};
use crate::domain::foundation::DomainError;
use crate::domain::message::MessageError;

use super::dto::{ErrorResponse, RunningResponse, SentMessagesParams, StatusMessageResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct MessageHandlers {
    dispatcher: Arc<MessageDispatcher>,
    list_handler: Arc<ListSentMessagesHandler>,
}

impl MessageHandlers {
    pub fn new(
        dispatcher: Arc<MessageDispatcher>,
        list_handler: Arc<ListSentMessagesHandler>,
    ) -> Self {
        Self {
            dispatcher,
            list_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /start - Start the dispatch loop
pub async fn start_sender(State(handlers): State<MessageHandlers>) -> Response {
    let status = if handlers.dispatcher.start().await {
        tracing::info!("Message sender started via API");
        StatusMessageResponse::STARTED
    } else {
        StatusMessageResponse::ALREADY_RUNNING
    };
    (StatusCode::OK, Json(StatusMessageResponse::new(status))).into_response()
}

/// POST /stop - Stop the dispatch loop, waiting for the current tick
pub async fn stop_sender(State(handlers): State<MessageHandlers>) -> Response {
    let status = if handlers.dispatcher.stop().await {
        tracing::info!("Message sender stopped via API");
        StatusMessageResponse::STOPPED
    } else {
        StatusMessageResponse::NOT_RUNNING
    };
    (StatusCode::OK, Json(StatusMessageResponse::new(status))).into_response()
}

/// GET /status - Report whether the loop is running
pub async fn sender_status(State(handlers): State<MessageHandlers>) -> Response {
    let response = RunningResponse {
        running: handlers.dispatcher.is_running(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /sent - Page through sent messages
pub async fn list_sent_messages(
    State(handlers): State<MessageHandlers>,
    Query(params): Query<SentMessagesParams>,
) -> Response {
    let query = ListSentMessagesQuery {
        page: params.page(),
        page_size: params.page_size(),
    };

    match handlers.list_handler.handle(query).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => handle_message_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_message_error(error: MessageError) -> Response {
    match &error {
        MessageError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found(format!("Message not found: {}", id))),
        )
            .into_response(),
        MessageError::Validation(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(e.to_string())),
        )
            .into_response(),
        MessageError::OperationFailed { .. } => {
            tracing::error!(error = %error, "Failed to list sent messages");
            let domain: DomainError = error.into();
            let details = serde_json::to_value(&domain.details).ok();
            let mut body = ErrorResponse::internal("Failed to retrieve sent messages");
            if let Some(details) = details {
                body = body.with_details(details);
            }
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{MessageId, ValidationError};

    #[test]
    fn store_failure_maps_to_500() {
        let response =
            handle_message_error(MessageError::operation_failed("list_sent", "connection lost"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = handle_message_error(MessageError::not_found(MessageId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_400() {
        let response =
            handle_message_error(MessageError::Validation(ValidationError::empty_field("to")));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
