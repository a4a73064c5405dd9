//! Message entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::profile::RoleDb;

/// Database row mapping for the messages table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageEntity {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub read: bool,
    pub client_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageEntity> for domain::models::Message {
    fn from(entity: MessageEntity) -> Self {
        Self {
            id: entity.id,
            sender_id: entity.sender_id,
            receiver_id: entity.receiver_id,
            content: entity.content,
            image_url: entity.image_url,
            read: entity.read,
            client_id: entity.client_id,
            created_at: entity.created_at,
        }
    }
}

/// Chat contact with the number of unread messages they sent.
#[derive(Debug, Clone, FromRow)]
pub struct ContactEntity {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: RoleDb,
    pub unread_count: i64,
}

impl From<ContactEntity> for domain::models::message::Contact {
    fn from(entity: ContactEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            email: entity.email,
            role: entity.role.into(),
            unread_count: entity.unread_count,
        }
    }
}
