//! Authentication service for signup, login, session rotation and onboarding.

use chrono::{Duration, Utc};
use domain::models::business::{generate_invite_code, normalize_invite_code};
use domain::models::user::normalize_email;
use domain::models::{Profile, Role};
use persistence::entities::RoleDb;
use persistence::repositories::{BusinessRepository, NewAccount, ProfileRepository, UserRepository};
use shared::crypto::sha256_hex;
use shared::jwt::{JwtError, TokenKind, TokenSigner};
use shared::password::{check_password_policy, hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

const INVITE_CODE_ATTEMPTS: usize = 5;
const INVITE_CODE_CONSTRAINT: &str = "idx_businesses_invite_code";

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid or expired onboarding link")]
    InvalidOnboardingToken,

    #[error("Business name is required for owners")]
    MissingBusinessName,

    #[error("Invite code is required for employees")]
    MissingInviteCode,

    #[error("Invalid invite code")]
    UnknownInviteCode,

    #[error("Admins are added by the business owner")]
    SignupRoleNotAllowed,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Could not allocate a unique invite code")]
    InviteCodeExhausted,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::InvalidOnboardingToken => ApiError::Unauthorized(err.to_string()),
            AuthError::MissingBusinessName
            | AuthError::MissingInviteCode
            | AuthError::UnknownInviteCode
            | AuthError::SignupRoleNotAllowed => ApiError::Validation(err.to_string()),
            AuthError::ProfileNotFound => ApiError::NotFound(err.to_string()),
            AuthError::InviteCodeExhausted => ApiError::Internal(err.to_string()),
            AuthError::Token(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::Password(e) => e.into(),
            AuthError::Database(e) => e.into(),
        }
    }
}

/// Access and refresh token pair handed to the client.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Result of a successful signup, login or onboarding.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub tokens: TokenPair,
    pub profile: Profile,
}

impl AuthResult {
    /// Where the client should land after signing in.
    pub fn redirect(&self) -> &'static str {
        self.profile.role.map_or("/", |role| role.home_path())
    }
}

/// Input for [`AuthService::signup`].
#[derive(Debug, Clone)]
pub struct Signup<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub role: Role,
    pub business_name: Option<&'a str>,
    pub invite_code: Option<&'a str>,
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    businesses: BusinessRepository,
    profiles: ProfileRepository,
    signer: Arc<TokenSigner>,
    min_password_length: usize,
}

impl AuthService {
    pub fn new(pool: PgPool, signer: Arc<TokenSigner>, min_password_length: usize) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            businesses: BusinessRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool),
            signer,
            min_password_length,
        }
    }

    /// Registers an owner together with a new business, or an employee
    /// joining a business by invite code.
    pub async fn signup(&self, input: Signup<'_>) -> Result<AuthResult, AuthError> {
        check_password_policy(input.password, self.min_password_length)?;

        let email = normalize_email(input.email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(input.password)?;
        let account = NewAccount {
            email: &email,
            password_hash: Some(&password_hash),
            full_name: input.full_name.trim(),
        };

        let profile = match input.role {
            Role::Owner => {
                let business_name = shared::validation::non_blank(input.business_name)
                    .ok_or(AuthError::MissingBusinessName)?;
                self.create_owner(&account, &business_name).await?
            }
            Role::Employee => {
                let code = input
                    .invite_code
                    .map(normalize_invite_code)
                    .filter(|c| !c.is_empty())
                    .ok_or(AuthError::MissingInviteCode)?;
                let business = self
                    .businesses
                    .find_by_invite_code(&code)
                    .await?
                    .ok_or(AuthError::UnknownInviteCode)?;
                let (_, profile) = self
                    .users
                    .create_member(&account, business.id, RoleDb::Employee)
                    .await
                    .map_err(email_conflict)?;
                profile
            }
            Role::Admin => return Err(AuthError::SignupRoleNotAllowed),
        };

        let profile = Profile::from(profile);
        tracing::info!(
            user_id = %profile.id,
            role = ?profile.role,
            "User signed up"
        );

        let tokens = self.issue_session(profile.id).await?;
        Ok(AuthResult { tokens, profile })
    }

    async fn create_owner(
        &self,
        account: &NewAccount<'_>,
        business_name: &str,
    ) -> Result<persistence::entities::ProfileEntity, AuthError> {
        for _ in 0..INVITE_CODE_ATTEMPTS {
            let code = generate_invite_code();
            match self
                .users
                .create_owner_with_business(account, business_name, &code)
                .await
            {
                Ok((_, profile, business)) => {
                    tracing::info!(business_id = %business.id, "Business created");
                    return Ok(profile);
                }
                Err(e) if violates(&e, INVITE_CODE_CONSTRAINT) => {
                    tracing::debug!("Invite code collision, retrying");
                }
                Err(e) => return Err(email_conflict(e)),
            }
        }
        Err(AuthError::InviteCodeExhausted)
    }

    /// Verifies credentials and opens a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Invited users have no password until onboarding completes.
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let profile = self.load_profile(user.id).await?;
        let tokens = self.issue_session(user.id).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthResult { tokens, profile })
    }

    /// Rotates both tokens of the session the refresh token belongs to.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .signer
            .validate(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        let user_id = claims.user_id().map_err(|_| AuthError::InvalidRefreshToken)?;

        let session = self
            .users
            .find_session_by_refresh(&sha256_hex(&claims.jti), user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let access = self.signer.issue_access(user_id)?;
        let refresh = self.signer.issue_refresh(user_id)?;
        self.users
            .rotate_session(
                session.id,
                &sha256_hex(&access.jti),
                &sha256_hex(&refresh.jti),
                self.refresh_expiry(),
            )
            .await?;

        tracing::debug!(user_id = %user_id, session_id = %session.id, "Session rotated");
        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: self.signer.access_ttl_secs,
        })
    }

    /// Ends the session. Unknown or expired refresh tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let Ok(claims) = self.signer.validate(refresh_token, TokenKind::Refresh) else {
            return Ok(());
        };
        let Ok(user_id) = claims.user_id() else {
            return Ok(());
        };

        if self
            .users
            .delete_session_by_refresh(&sha256_hex(&claims.jti), user_id)
            .await?
        {
            tracing::info!(user_id = %user_id, "User logged out");
        }
        Ok(())
    }

    /// Sets the first password of an invited user and signs them in.
    ///
    /// The password is expected to be checked already.
    pub async fn complete_onboarding(
        &self,
        token: &str,
        password: &str,
    ) -> Result<AuthResult, AuthError> {
        let password_hash = hash_password(password)?;
        let user_id = self
            .users
            .consume_onboarding_token(&sha256_hex(token), &password_hash)
            .await?
            .ok_or(AuthError::InvalidOnboardingToken)?;

        let profile = self.load_profile(user_id).await?;
        let tokens = self.issue_session(user_id).await?;
        tracing::info!(user_id = %user_id, "Onboarding completed");

        Ok(AuthResult { tokens, profile })
    }

    /// Issues a token pair and stores the session keyed by the token ids.
    pub async fn issue_session(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let access = self.signer.issue_access(user_id)?;
        let refresh = self.signer.issue_refresh(user_id)?;

        self.users
            .create_session(
                user_id,
                &sha256_hex(&access.jti),
                &sha256_hex(&refresh.jti),
                self.refresh_expiry(),
            )
            .await?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: self.signer.access_ttl_secs,
        })
    }

    async fn load_profile(&self, user_id: Uuid) -> Result<Profile, AuthError> {
        self.profiles
            .find_by_id(user_id)
            .await?
            .map(Profile::from)
            .ok_or(AuthError::ProfileNotFound)
    }

    fn refresh_expiry(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::seconds(self.signer.refresh_ttl_secs)
    }
}

fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some(constraint),
        _ => false,
    }
}

/// A unique violation while inserting an account means the email raced
/// with another signup.
fn email_conflict(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AuthError::EmailAlreadyExists
        }
        _ => AuthError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(role: Option<Role>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            business_id: Some(Uuid::new_v4()),
            role,
            full_name: None,
            email: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn result(role: Option<Role>) -> AuthResult {
        AuthResult {
            tokens: TokenPair {
                access_token: "a".into(),
                refresh_token: "r".into(),
                expires_in: 3600,
            },
            profile: profile(role),
        }
    }

    #[test]
    fn test_redirect_by_role() {
        assert_eq!(result(Some(Role::Owner)).redirect(), "/dashboard");
        assert_eq!(result(Some(Role::Admin)).redirect(), "/dashboard");
        assert_eq!(result(Some(Role::Employee)).redirect(), "/employee");
        assert_eq!(result(None).redirect(), "/");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::EmailAlreadyExists),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::UnknownInviteCode),
            ApiError::Validation(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::Password(PasswordError::TooShort(6))),
            ApiError::Validation(_)
        ));
    }

    #[test]
    fn test_non_database_error_is_not_a_conflict() {
        assert!(matches!(
            email_conflict(sqlx::Error::RowNotFound),
            AuthError::Database(_)
        ));
        assert!(!violates(&sqlx::Error::RowNotFound, INVITE_CODE_CONSTRAINT));
    }
}
