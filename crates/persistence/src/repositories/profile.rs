//! Profile repository: business membership, roles and contacts.

use domain::models::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ContactEntity, EmployeeEntity, ProfileEntity};
use crate::metrics::QueryTimer;

const PROFILE_COLUMNS: &str = "id, business_id, role, full_name, email, created_at, updated_at";

fn role_names(roles: &[Role]) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_string()).collect()
}

/// Repository for profile operations.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_id");
        let result = sqlx::query_as::<_, ProfileEntity>(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Finds a profile only when it belongs to `business_id`.
    pub async fn find_in_business(
        &self,
        id: Uuid,
        business_id: Uuid,
    ) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_in_business");
        let result = sqlx::query_as::<_, ProfileEntity>(&format!(
            "SELECT {} FROM profiles WHERE id = $1 AND business_id = $2",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Members of a business with one of `roles`, flagged when clocked in.
    pub async fn list_members(
        &self,
        business_id: Uuid,
        roles: &[Role],
    ) -> Result<Vec<EmployeeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_business_members");
        let result = sqlx::query_as::<_, EmployeeEntity>(
            r#"
            SELECT
                p.id, p.full_name, p.email, p.role, p.created_at,
                EXISTS (
                    SELECT 1 FROM timesheets t
                    WHERE t.user_id = p.id AND t.status = 'active'
                ) AS clocked_in
            FROM profiles p
            WHERE p.business_id = $1 AND p.role::text = ANY($2)
            ORDER BY p.full_name NULLS LAST, p.created_at
            "#,
        )
        .bind(business_id)
        .bind(role_names(roles))
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Counts members of a business with the given role.
    pub async fn count_by_role(&self, business_id: Uuid, role: Role) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_profiles_by_role");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            "SELECT COUNT(*) FROM profiles WHERE business_id = $1 AND role::text = $2",
        )
        .bind(business_id)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await;
        timer.finish(result).map(|(count,)| count)
    }

    /// How many of `ids` are employees of `business_id`.
    pub async fn count_employees_among(
        &self,
        business_id: Uuid,
        ids: &[Uuid],
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_employees_among");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM profiles
            WHERE business_id = $1 AND role = 'employee' AND id = ANY($2)
            "#,
        )
        .bind(business_id)
        .bind(ids)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result).map(|(count,)| count)
    }

    /// Ids of the owner and admins of a business.
    pub async fn manager_ids(&self, business_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("list_manager_ids");
        let result: Result<Vec<(Uuid,)>, sqlx::Error> = sqlx::query_as(
            "SELECT id FROM profiles WHERE business_id = $1 AND role IN ('owner', 'admin')",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await;
        timer
            .finish(result)
            .map(|rows| rows.into_iter().map(|(id,)| id).collect())
    }

    /// Updates the display name and email on both the profile and the
    /// login identity.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<ProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_profile");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE users SET email = $1, updated_at = NOW() WHERE id = $2 AND email <> $1",
        )
        .bind(email)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let profile = sqlx::query_as::<_, ProfileEntity>(&format!(
            r#"
            UPDATE profiles
            SET full_name = $1, email = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(full_name)
        .bind(email)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(profile)
    }

    /// People in the business the caller may message, with the number of
    /// unread messages each has sent the caller.
    pub async fn list_contacts(
        &self,
        business_id: Uuid,
        caller_id: Uuid,
        roles: &[Role],
    ) -> Result<Vec<ContactEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_contacts");
        let result = sqlx::query_as::<_, ContactEntity>(
            r#"
            SELECT
                p.id, p.full_name, p.email, p.role,
                (
                    SELECT COUNT(*) FROM messages m
                    WHERE m.sender_id = p.id AND m.receiver_id = $2 AND m.read = false
                ) AS unread_count
            FROM profiles p
            WHERE p.business_id = $1 AND p.id <> $2 AND p.role::text = ANY($3)
            ORDER BY p.role, p.full_name NULLS LAST
            "#,
        )
        .bind(business_id)
        .bind(caller_id)
        .bind(role_names(roles))
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }
}
