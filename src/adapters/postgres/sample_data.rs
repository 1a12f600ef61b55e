//! Sample data for local runs.

use crate::domain::foundation::Timestamp;
use crate::domain::message::{Message, MessageError};
use crate::ports::MessageRepository;

use super::PostgresMessageRepository;

/// Builds the demo messages, staggered an hour apart so ordering is visible.
pub fn sample_messages() -> Result<Vec<Message>, MessageError> {
    let now = Timestamp::now();
    let samples = [
        ("+905071773757", "Merhaba! Bu bir örnek mesajdır.", 0),
        ("+90555255555", "İkinci örnek mesaj", 1),
        ("+905071773525", "Üçüncü örnek mesaj", 2),
    ];

    samples
        .into_iter()
        .map(|(to, content, hours_ago)| {
            Message::new(to, content)
                .map(|m| m.with_created_at(now.minus_hours(hours_ago)))
                .map_err(MessageError::from)
        })
        .collect()
}

/// Inserts the sample messages when the table holds no live rows.
///
/// Returns the number of messages inserted.
pub async fn seed_sample_data(repo: &PostgresMessageRepository) -> Result<usize, MessageError> {
    if repo.count().await? > 0 {
        tracing::debug!("Messages table not empty, skipping sample data");
        return Ok(0);
    }

    let messages = sample_messages()?;
    for message in &messages {
        repo.create(message).await?;
    }

    tracing::info!(count = messages.len(), "Inserted sample messages");
    Ok(messages.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_messages_are_valid_and_unsent() {
        let messages = sample_messages().unwrap();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| !m.is_sent()));
    }

    #[test]
    fn sample_messages_are_staggered_newest_first() {
        let messages = sample_messages().unwrap();
        assert!(messages[0].created_at().is_after(&messages[1].created_at()));
        assert!(messages[1].created_at().is_after(&messages[2].created_at()));
    }
}
