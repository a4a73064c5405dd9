//! Direct message domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::role::Role;

/// A message between two members of the same business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub read: bool,
    pub client_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for sending a message.
///
/// `client_id` is chosen by the sender; resending the same id returns the
/// stored message instead of creating a duplicate.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,

    pub content: Option<String>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,

    #[validate(length(min = 1, max = 64, message = "clientId must be 1-64 characters"))]
    pub client_id: Option<String>,
}

impl SendMessageRequest {
    /// Trimmed text content, `None` when empty.
    pub fn text(&self) -> Option<String> {
        shared::validation::non_blank(self.content.as_deref())
    }

    /// A message needs text or an image.
    pub fn has_body(&self) -> bool {
        self.text().is_some() || self.image_url.is_some()
    }

    /// True when the trimmed text is longer than `max` characters.
    pub fn exceeds_length(&self, max: usize) -> bool {
        self.text().is_some_and(|t| t.chars().count() > max)
    }
}

/// Response after sending a message.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    pub message: Message,
    /// False when an earlier send with the same client id was returned.
    pub created: bool,
}

/// Request payload for marking messages read.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarkMessagesReadRequest {
    #[validate(length(min = 1, max = 500, message = "Provide 1-500 message ids"))]
    pub message_ids: Vec<Uuid>,
}

/// Unread message counter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

/// Someone the caller can chat with.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    pub unread_count: i64,
}

/// Roles the caller may message.
///
/// Employees talk to management; owners and admins talk to everyone.
pub fn contact_roles(caller: Role) -> &'static [Role] {
    match caller {
        Role::Employee => &[Role::Owner, Role::Admin],
        Role::Owner | Role::Admin => &[Role::Owner, Role::Admin, Role::Employee],
    }
}
