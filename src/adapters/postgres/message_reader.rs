//! PostgreSQL implementation of MessageReader.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::message::{Message, MessageError};
use crate::ports::{MessageReader, PageRequest, SentMessagePage};

use super::message_repository::row_to_message;

/// Read-side queries over the `messages` table.
#[derive(Clone)]
pub struct PostgresMessageReader {
    pool: PgPool,
}

impl PostgresMessageReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageReader for PostgresMessageReader {
    async fn list_sent(&self, page: PageRequest) -> Result<SentMessagePage, MessageError> {
        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE is_sent = TRUE AND deleted_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MessageError::operation_failed("count_sent", e.to_string()))?;

        let rows = sqlx::query(
            r#"
            SELECT id, "to", content, sent_at, created_at, updated_at, deleted_at
            FROM messages
            WHERE is_sent = TRUE AND deleted_at IS NULL
            ORDER BY sent_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.page_size))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MessageError::operation_failed("list_sent", e.to_string()))?;

        let items: Result<Vec<Message>, MessageError> =
            rows.into_iter().map(row_to_message).collect();

        Ok(SentMessagePage {
            items: items?,
            total: total.0.max(0) as u64,
        })
    }
}
