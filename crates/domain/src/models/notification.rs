//! In-app notification models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of in-app notification, stored in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    JobAssignment,
    JobResponse,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::JobAssignment => "job_assignment",
            NotificationKind::JobResponse => "job_response",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Response for the notification inbox.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsResponse {
    pub data: Vec<Notification>,
    pub unread_count: i64,
}

/// Request payload for marking notifications read. No ids means all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkNotificationsReadRequest {
    #[serde(default)]
    pub ids: Option<Vec<i64>>,
}

/// Response after marking notifications read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub success: bool,
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        assert_eq!(NotificationKind::JobAssignment.to_string(), "job_assignment");
        assert_eq!(
            serde_json::to_string(&NotificationKind::JobResponse).unwrap(),
            "\"job_response\""
        );
    }

    #[test]
    fn test_notification_serializes_type_field() {
        let n = Notification {
            id: 7,
            user_id: Uuid::nil(),
            kind: "job_assignment".to_string(),
            title: "New Job Assigned".to_string(),
            message: "You have been assigned to job: Fix roof".to_string(),
            link: Some("/employee/jobs".to_string()),
            read: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "job_assignment");
        assert_eq!(json["userId"], Uuid::nil().to_string());
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_mark_read_request_all() {
        let req: MarkNotificationsReadRequest = serde_json::from_str("{}").unwrap();
        assert!(req.ids.is_none());
        let req: MarkNotificationsReadRequest = serde_json::from_str(r#"{"ids": [1, 2]}"#).unwrap();
        assert_eq!(req.ids, Some(vec![1, 2]));
    }
}
