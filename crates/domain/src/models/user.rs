//! User authentication domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login identity. Business data lives on the matching [`Profile`].
///
/// [`Profile`]: super::profile::Profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Invited employees have no password until they complete onboarding.
    pub fn is_pending_onboarding(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Represents an active user session with JWT tokens.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub refresh_token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

/// Normalizes an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "crew@example.com".to_string(),
            password_hash: Some("secret_hash".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret_hash"));
        assert!(!json.contains("passwordHash"));
        assert!(json.contains("createdAt"));
    }

    #[test]
    fn test_pending_onboarding() {
        let mut user = User {
            id: Uuid::new_v4(),
            email: "new@example.com".to_string(),
            password_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(user.is_pending_onboarding());
        user.password_hash = Some("$argon2id$...".to_string());
        assert!(!user.is_pending_onboarding());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }
}
