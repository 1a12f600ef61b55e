//! PostgreSQL implementation of MessageRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::foundation::{MessageId, Timestamp};
use crate::domain::message::{Message, MessageContent, MessageError, Recipient};
use crate::ports::MessageRepository;

/// PostgreSQL implementation of MessageRepository.
#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Number of live messages, sent or not.
    pub async fn count(&self) -> Result<u64, MessageError> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM messages WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| MessageError::operation_failed("count_messages", e.to_string()))?;

        Ok(result.0.max(0) as u64)
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn fetch_unsent(&self, limit: u32) -> Result<Vec<Message>, MessageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, "to", content, sent_at, created_at, updated_at, deleted_at
            FROM messages
            WHERE is_sent = FALSE AND deleted_at IS NULL
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MessageError::operation_failed("fetch_unsent", e.to_string()))?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn mark_sent(&self, id: &MessageId) -> Result<(), MessageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| MessageError::operation_failed("mark_sent", e.to_string()))?;

        let row = sqlx::query(
            r#"
            SELECT is_sent
            FROM messages
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| MessageError::operation_failed("mark_sent", e.to_string()))?;

        // Dropping the transaction rolls it back.
        let Some(row) = row else {
            return Err(MessageError::not_found(*id));
        };

        let already_sent: bool = row
            .try_get("is_sent")
            .map_err(|e| MessageError::operation_failed("mark_sent", e.to_string()))?;

        if !already_sent {
            let now = Timestamp::now();
            sqlx::query(
                r#"
                UPDATE messages SET
                    is_sent = TRUE,
                    sent_at = $2,
                    updated_at = $2
                WHERE id = $1
                "#,
            )
            .bind(id.as_uuid())
            .bind(now.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(|e| MessageError::operation_failed("mark_sent", e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| MessageError::operation_failed("mark_sent", e.to_string()))?;

        Ok(())
    }

    async fn create(&self, message: &Message) -> Result<(), MessageError> {
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, "to", content, is_sent, sent_at, created_at, updated_at, deleted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.to().as_str())
        .bind(message.content().as_str())
        .bind(message.is_sent())
        .bind(message.sent_at().map(|t| *t.as_datetime()))
        .bind(message.created_at().as_datetime())
        .bind(message.updated_at().as_datetime())
        .bind(message.deleted_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| MessageError::operation_failed("create_message", e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, MessageError> {
        let row = sqlx::query(
            r#"
            SELECT id, "to", content, sent_at, created_at, updated_at, deleted_at
            FROM messages
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MessageError::operation_failed("find_message", e.to_string()))?;

        row.map(row_to_message).transpose()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn column_error(column: &str, e: sqlx::Error) -> MessageError {
    MessageError::operation_failed("decode_message", format!("column {}: {}", column, e))
}

/// Maps a `messages` row to the aggregate.
///
/// Shared with the reader, which selects the same columns.
pub(super) fn row_to_message(row: sqlx::postgres::PgRow) -> Result<Message, MessageError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| column_error("id", e))?;
    let to: String = row.try_get("to").map_err(|e| column_error("to", e))?;
    let content: String = row.try_get("content").map_err(|e| column_error("content", e))?;
    let sent_at: Option<DateTime<Utc>> =
        row.try_get("sent_at").map_err(|e| column_error("sent_at", e))?;
    let created_at: DateTime<Utc> =
        row.try_get("created_at").map_err(|e| column_error("created_at", e))?;
    let updated_at: DateTime<Utc> =
        row.try_get("updated_at").map_err(|e| column_error("updated_at", e))?;
    let deleted_at: Option<DateTime<Utc>> =
        row.try_get("deleted_at").map_err(|e| column_error("deleted_at", e))?;

    let to = Recipient::new(to)
        .map_err(|e| MessageError::operation_failed("decode_message", e.to_string()))?;
    let content = MessageContent::new(content)
        .map_err(|e| MessageError::operation_failed("decode_message", e.to_string()))?;

    Ok(Message::reconstitute(
        MessageId::from_uuid(id),
        to,
        content,
        sent_at.map(Timestamp::from_datetime),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
        deleted_at.map(Timestamp::from_datetime),
    ))
}
