//! Business entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the businesses table.
#[derive(Debug, Clone, FromRow)]
pub struct BusinessEntity {
    pub id: Uuid,
    pub name: String,
    pub invite_code: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<BusinessEntity> for domain::models::Business {
    fn from(entity: BusinessEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            invite_code: entity.invite_code,
            owner_id: entity.owner_id,
            created_at: entity.created_at,
        }
    }
}
