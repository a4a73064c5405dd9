//! Profile entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::Role;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum RoleDb {
    Owner,
    Admin,
    Employee,
}

impl From<RoleDb> for Role {
    fn from(db_role: RoleDb) -> Self {
        match db_role {
            RoleDb::Owner => Role::Owner,
            RoleDb::Admin => Role::Admin,
            RoleDb::Employee => Role::Employee,
        }
    }
}

impl From<Role> for RoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Owner => RoleDb::Owner,
            Role::Admin => RoleDb::Admin,
            Role::Employee => RoleDb::Employee,
        }
    }
}

/// Database row mapping for the profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub id: Uuid,
    pub business_id: Option<Uuid>,
    pub role: Option<RoleDb>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileEntity> for domain::models::Profile {
    fn from(entity: ProfileEntity) -> Self {
        Self {
            id: entity.id,
            business_id: entity.business_id,
            role: entity.role.map(Into::into),
            full_name: entity.full_name,
            email: entity.email,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Business member with clock-in state, for the employees page.
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeEntity {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: RoleDb,
    pub clocked_in: bool,
    pub created_at: DateTime<Utc>,
}

impl From<EmployeeEntity> for domain::models::profile::EmployeeSummary {
    fn from(entity: EmployeeEntity) -> Self {
        Self {
            id: entity.id,
            full_name: entity.full_name,
            email: entity.email,
            role: entity.role.into(),
            clocked_in: entity.clocked_in,
            created_at: entity.created_at,
        }
    }
}
