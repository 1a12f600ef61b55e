//! Message-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, MessageId, ValidationError};

/// Errors raised by message stores and the dispatch flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The message does not exist or has been soft-deleted.
    #[error("message not found: {0}")]
    NotFound(MessageId),

    /// A store operation failed (I/O error or deadline exceeded).
    #[error("{operation} failed: {reason}")]
    OperationFailed {
        operation: &'static str,
        reason: String,
    },

    /// The message violates a creation-time rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl MessageError {
    pub fn not_found(id: MessageId) -> Self {
        MessageError::NotFound(id)
    }

    pub fn operation_failed(operation: &'static str, reason: impl Into<String>) -> Self {
        MessageError::OperationFailed {
            operation,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            MessageError::NotFound(_) => ErrorCode::MessageNotFound,
            MessageError::OperationFailed { .. } => ErrorCode::DatabaseError,
            MessageError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}

impl From<MessageError> for DomainError {
    fn from(err: MessageError) -> Self {
        let base = DomainError::new(err.code(), err.to_string());
        match err {
            MessageError::NotFound(id) => base.with_detail("message_id", id.to_string()),
            MessageError::OperationFailed { operation, .. } => {
                base.with_detail("operation", operation)
            }
            MessageError::Validation(validation) => {
                base.with_detail("field", validation.field().to_string())
            }
        }
    }
}
