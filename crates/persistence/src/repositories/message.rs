//! Direct message repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::MessageEntity;
use crate::metrics::QueryTimer;

const MESSAGE_COLUMNS: &str =
    "id, sender_id, receiver_id, content, image_url, read, client_id, created_at";

/// Repository for direct messages.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a message. When the sender already stored a message with the
    /// same `client_id`, that message is returned instead and the flag is
    /// false.
    pub async fn insert_or_get(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: Option<&str>,
        image_url: Option<&str>,
        client_id: Option<&str>,
    ) -> Result<(MessageEntity, bool), sqlx::Error> {
        let timer = QueryTimer::new("insert_message");

        let inserted = sqlx::query_as::<_, MessageEntity>(&format!(
            r#"
            INSERT INTO messages (sender_id, receiver_id, content, image_url, client_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (sender_id, client_id) DO NOTHING
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(image_url)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await;

        if let Some(message) = timer.finish(inserted)? {
            return Ok((message, true));
        }

        // Only reachable with a client id: NULLs never conflict.
        let timer = QueryTimer::new("find_message_by_client_id");
        let existing = sqlx::query_as::<_, MessageEntity>(&format!(
            "SELECT {} FROM messages WHERE sender_id = $1 AND client_id = $2",
            MESSAGE_COLUMNS
        ))
        .bind(sender_id)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(existing).map(|message| (message, false))
    }

    /// Messages between two users in both directions, oldest first.
    pub async fn conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        limit: i64,
    ) -> Result<Vec<MessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_conversation");
        let result = sqlx::query_as::<_, MessageEntity>(&format!(
            r#"
            SELECT {} FROM (
                SELECT {}
                FROM messages
                WHERE (sender_id = $1 AND receiver_id = $2)
                   OR (sender_id = $2 AND receiver_id = $1)
                ORDER BY created_at DESC
                LIMIT $3
            ) recent
            ORDER BY created_at
            "#,
            MESSAGE_COLUMNS, MESSAGE_COLUMNS
        ))
        .bind(user_a)
        .bind(user_b)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Marks the given messages read. Only messages addressed to
    /// `receiver_id` are touched.
    pub async fn mark_read(&self, receiver_id: Uuid, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_messages_read");
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read = true
            WHERE receiver_id = $1 AND id = ANY($2) AND read = false
            "#,
        )
        .bind(receiver_id)
        .bind(ids)
        .execute(&self.pool)
        .await;
        timer.finish(result).map(|r| r.rows_affected())
    }

    pub async fn unread_count(&self, receiver_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_unread_messages");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND read = false",
        )
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result).map(|(count,)| count)
    }
}
