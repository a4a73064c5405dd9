//! Notification repository.

use async_trait::async_trait;
use domain::models::NewNotification;
use domain::services::NotificationSink;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::NotificationEntity;
use crate::metrics::QueryTimer;

/// Repository for the in-app notification inbox.
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a batch of notifications with one statement.
    pub async fn insert_many(&self, notifications: &[NewNotification]) -> Result<u64, sqlx::Error> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let mut user_ids = Vec::with_capacity(notifications.len());
        let mut kinds = Vec::with_capacity(notifications.len());
        let mut titles = Vec::with_capacity(notifications.len());
        let mut messages = Vec::with_capacity(notifications.len());
        let mut links = Vec::with_capacity(notifications.len());
        for n in notifications {
            user_ids.push(n.user_id);
            kinds.push(n.kind.as_str().to_string());
            titles.push(n.title.clone());
            messages.push(n.message.clone());
            links.push(n.link.clone());
        }

        let timer = QueryTimer::new("insert_notifications");
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, type, title, message, link)
            SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::text[], $5::text[])
            "#,
        )
        .bind(&user_ids)
        .bind(&kinds)
        .bind(&titles)
        .bind(&messages)
        .bind(&links)
        .execute(&self.pool)
        .await;
        timer.finish(result).map(|r| r.rows_affected())
    }

    /// The user's notifications, newest first.
    pub async fn list(&self, user_id: Uuid, limit: i64) -> Result<Vec<NotificationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_notifications");
        let result = sqlx::query_as::<_, NotificationEntity>(
            r#"
            SELECT id, user_id, type, title, message, link, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_unread_notifications");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result).map(|(count,)| count)
    }

    /// Marks the given notifications, or all of them when `ids` is `None`,
    /// as read.
    pub async fn mark_read(&self, user_id: Uuid, ids: Option<&[i64]>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_notifications_read");
        let result = match ids {
            Some(ids) => {
                sqlx::query(
                    r#"
                    UPDATE notifications
                    SET read = true
                    WHERE user_id = $1 AND id = ANY($2) AND read = false
                    "#,
                )
                .bind(user_id)
                .bind(ids)
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query("UPDATE notifications SET read = true WHERE user_id = $1 AND read = false")
                    .bind(user_id)
                    .execute(&self.pool)
                    .await
            }
        };
        timer.finish(result).map(|r| r.rows_affected())
    }
}

#[async_trait]
impl NotificationSink for NotificationRepository {
    type Error = sqlx::Error;

    async fn deliver(&self, notifications: &[NewNotification]) -> Result<(), sqlx::Error> {
        self.insert_many(notifications).await.map(|_| ())
    }
}
