//! User repository: accounts, sessions and onboarding tokens.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{BusinessEntity, ProfileEntity, RoleDb, UserEntity, UserSessionEntity};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";
const PROFILE_COLUMNS: &str = "id, business_id, role, full_name, email, created_at, updated_at";
const SESSION_COLUMNS: &str =
    "id, user_id, token_hash, refresh_token_hash, expires_at, created_at, last_used_at";

/// Login identity to create together with its profile.
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    /// Already normalized.
    pub email: &'a str,
    /// `None` for invited users who set a password during onboarding.
    pub password_hash: Option<&'a str>,
    pub full_name: &'a str,
}

/// Repository for user, session and onboarding token operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Creates the user, their business and their owner profile atomically.
    pub async fn create_owner_with_business(
        &self,
        account: &NewAccount<'_>,
        business_name: &str,
        invite_code: &str,
    ) -> Result<(UserEntity, ProfileEntity, BusinessEntity), sqlx::Error> {
        let timer = QueryTimer::new("create_owner_with_business");
        let mut tx = self.pool.begin().await?;

        let user = insert_user(&mut tx, account).await?;

        let business = sqlx::query_as::<_, BusinessEntity>(
            r#"
            INSERT INTO businesses (name, invite_code, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, invite_code, owner_id, created_at
            "#,
        )
        .bind(business_name)
        .bind(invite_code)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;

        let profile = insert_profile(&mut tx, &user, account.full_name, business.id, RoleDb::Owner).await?;

        tx.commit().await?;
        timer.record();
        Ok((user, profile, business))
    }

    /// Creates a user and a profile in an existing business atomically.
    pub async fn create_member(
        &self,
        account: &NewAccount<'_>,
        business_id: Uuid,
        role: RoleDb,
    ) -> Result<(UserEntity, ProfileEntity), sqlx::Error> {
        let timer = QueryTimer::new("create_member");
        let mut tx = self.pool.begin().await?;

        let user = insert_user(&mut tx, account).await?;
        let profile = insert_profile(&mut tx, &user, account.full_name, business_id, role).await?;

        tx.commit().await?;
        timer.record();
        Ok((user, profile))
    }

    /// Replaces the password hash. Returns false when the user is gone.
    pub async fn set_password(&self, user_id: Uuid, password_hash: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_user_password");
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.finish(result).map(|r| r.rows_affected() > 0)
    }

    /// Deletes a user; profile, sessions and owned rows cascade.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.finish(result).map(|r| r.rows_affected() > 0)
    }

    /// Create a new user session.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<UserSessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user_session");
        let result = sqlx::query_as::<_, UserSessionEntity>(&format!(
            r#"
            INSERT INTO user_sessions (user_id, token_hash, refresh_token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SESSION_COLUMNS
        ))
        .bind(user_id)
        .bind(token_hash)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Finds a live session by the hash of its access token id.
    pub async fn find_session_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_session_by_token");
        let result = sqlx::query_as::<_, UserSessionEntity>(&format!(
            "SELECT {} FROM user_sessions WHERE token_hash = $1 AND expires_at > NOW()",
            SESSION_COLUMNS
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Finds a live session by the hash of its refresh token id.
    pub async fn find_session_by_refresh(
        &self,
        refresh_token_hash: &str,
        user_id: Uuid,
    ) -> Result<Option<UserSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_session_by_refresh");
        let result = sqlx::query_as::<_, UserSessionEntity>(&format!(
            r#"
            SELECT {}
            FROM user_sessions
            WHERE refresh_token_hash = $1 AND user_id = $2 AND expires_at > NOW()
            "#,
            SESSION_COLUMNS
        ))
        .bind(refresh_token_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Swaps a session's token hashes (refresh token rotation).
    pub async fn rotate_session(
        &self,
        session_id: Uuid,
        token_hash: &str,
        refresh_token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("rotate_session");
        let result = sqlx::query(
            r#"
            UPDATE user_sessions
            SET token_hash = $1, refresh_token_hash = $2, expires_at = $3, last_used_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(token_hash)
        .bind(refresh_token_hash)
        .bind(expires_at)
        .bind(session_id)
        .execute(&self.pool)
        .await;
        timer.finish(result).map(|_| ())
    }

    /// Deletes the session identified by a refresh token (logout).
    pub async fn delete_session_by_refresh(
        &self,
        refresh_token_hash: &str,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_session_by_refresh");
        let result = sqlx::query(
            "DELETE FROM user_sessions WHERE refresh_token_hash = $1 AND user_id = $2",
        )
        .bind(refresh_token_hash)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.finish(result).map(|r| r.rows_affected() > 0)
    }

    /// Revoke all sessions for a user.
    pub async fn revoke_all_sessions(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("revoke_all_sessions");
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.finish(result).map(|r| r.rows_affected())
    }

    /// Stores the hash of a new onboarding token.
    pub async fn create_onboarding_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("create_onboarding_token");
        let result = sqlx::query(
            "INSERT INTO onboarding_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await;
        timer.finish(result).map(|_| ())
    }

    /// Marks a usable onboarding token as used and sets the user's password
    /// in one transaction. Returns the user id, or `None` when the token is
    /// unknown, expired or already used.
    pub async fn consume_onboarding_token(
        &self,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("consume_onboarding_token");
        let mut tx = self.pool.begin().await?;

        let user_id: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE onboarding_tokens
            SET used_at = NOW()
            WHERE token_hash = $1 AND used_at IS NULL AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id,)) = user_id else {
            timer.record();
            return Ok(None);
        };

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(user_id))
    }
}

async fn insert_user(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    account: &NewAccount<'_>,
) -> Result<UserEntity, sqlx::Error> {
    sqlx::query_as::<_, UserEntity>(&format!(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(account.email)
    .bind(account.password_hash)
    .fetch_one(&mut **tx)
    .await
}

async fn insert_profile(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user: &UserEntity,
    full_name: &str,
    business_id: Uuid,
    role: RoleDb,
) -> Result<ProfileEntity, sqlx::Error> {
    sqlx::query_as::<_, ProfileEntity>(&format!(
        r#"
        INSERT INTO profiles (id, business_id, role, full_name, email)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        PROFILE_COLUMNS
    ))
    .bind(user.id)
    .bind(business_id)
    .bind(role)
    .bind(full_name)
    .bind(&user.email)
    .fetch_one(&mut **tx)
    .await
}
