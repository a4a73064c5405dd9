//! User management: invites, admins, password resets, deletion and the
//! caller's own account.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use domain::models::profile::{
    ChangePasswordRequest, CreateAdminRequest, InviteEmployeeRequest, InviteEmployeeResponse,
    ResetPasswordRequest, SuccessResponse, UpdateProfileRequest,
};
use domain::models::role::sets;
use domain::models::user::normalize_email;
use domain::models::{Profile, Role};
use persistence::entities::{ProfileEntity, RoleDb};
use persistence::repositories::{NewAccount, ProfileRepository, UserRepository};
use serde::Serialize;
use shared::crypto::{onboarding_token, sha256_hex};
use shared::password::{check_password_policy, hash_password};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, Caller, UserAuth};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub success: bool,
    pub user_id: Uuid,
}

fn email_taken(err: sqlx::Error) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            ApiError::Conflict("Email already registered".into())
        }
        _ => err.into(),
    }
}

fn not_in_business() -> ApiError {
    ApiError::Forbidden("Employee not found in your business".into())
}

/// Loads a member of `business_id` the caller's role may manage.
async fn managed_target(
    state: &AppState,
    caller_role: Role,
    business_id: Uuid,
    user_id: Uuid,
) -> Result<ProfileEntity, ApiError> {
    let target = ProfileRepository::new(state.pool.clone())
        .find_in_business(user_id, business_id)
        .await?
        .ok_or_else(not_in_business)?;

    let target_role = target.role.map(Role::from).ok_or_else(not_in_business)?;
    if !caller_role.can_manage(target_role) {
        return Err(ApiError::Forbidden(format!(
            "A {} cannot manage a {}",
            caller_role, target_role
        )));
    }
    Ok(target)
}

fn onboarding_link(base_url: &str, token: &str) -> String {
    format!("{}/onboarding?token={}", base_url.trim_end_matches('/'), token)
}

/// Invite an employee. Creates the account without a password and issues an
/// onboarding link.
///
/// POST /api/v1/users/invite
pub async fn invite_employee(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(request): ApiJson<InviteEmployeeRequest>,
) -> Result<(StatusCode, Json<InviteEmployeeResponse>), ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;
    request.validate()?;

    let email = normalize_email(&request.email);
    let users = UserRepository::new(state.pool.clone());
    if users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let (user, _) = users
        .create_member(
            &NewAccount {
                email: &email,
                password_hash: None,
                full_name: request.full_name.trim(),
            },
            auth.business_id,
            RoleDb::Employee,
        )
        .await
        .map_err(email_taken)?;

    let token = onboarding_token();
    let expires_at = Utc::now() + Duration::hours(state.config.auth.onboarding_token_ttl_hours);
    users
        .create_onboarding_token(user.id, &sha256_hex(&token), expires_at)
        .await?;

    // Email delivery is not wired up; the link is handed over out of band.
    info!(
        user_id = %user.id,
        business_id = %auth.business_id,
        invited_by = %auth.user_id,
        link = %onboarding_link(&state.config.auth.app_base_url, &token),
        "Employee invited"
    );

    Ok((
        StatusCode::CREATED,
        Json(InviteEmployeeResponse {
            success: true,
            user_id: user.id,
            onboarding_expires_at: expires_at,
        }),
    ))
}

/// POST /api/v1/users/admins
pub async fn create_admin(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(request): ApiJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let authorized = caller.authorize(sets::OWNER_ONLY)?;
    request.validate()?;
    check_password_policy(&request.password, state.config.auth.min_password_length)?;

    let email = normalize_email(&request.email);
    let password_hash = hash_password(&request.password)?;
    let (user, _) = UserRepository::new(state.pool.clone())
        .create_member(
            &NewAccount {
                email: &email,
                password_hash: Some(&password_hash),
                full_name: request.full_name.trim(),
            },
            authorized.business_id,
            RoleDb::Admin,
        )
        .await
        .map_err(email_taken)?;

    info!(
        user_id = %user.id,
        business_id = %authorized.business_id,
        "Admin created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            success: true,
            user_id: user.id,
        }),
    ))
}

/// Set a new password for a member and sign them out everywhere.
///
/// POST /api/v1/users/:user_id/password
pub async fn reset_user_password(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<Uuid>,
    ApiJson(request): ApiJson<ResetPasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let authorized = caller.authorize(sets::MANAGERS)?;
    request.validate()?;
    check_password_policy(&request.new_password, state.config.auth.min_password_length)?;

    managed_target(&state, authorized.role, authorized.business_id, user_id).await?;

    let password_hash = hash_password(&request.new_password)?;
    let users = UserRepository::new(state.pool.clone());
    if !users.set_password(user_id, &password_hash).await? {
        return Err(not_in_business());
    }
    let revoked = users.revoke_all_sessions(user_id).await?;

    info!(
        user_id = %user_id,
        reset_by = %authorized.user_id,
        revoked_sessions = revoked,
        "Password reset"
    );
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/v1/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let auth = caller.authorize(sets::OWNER_ONLY)?;
    if user_id == auth.user_id {
        return Err(ApiError::Validation("You cannot delete your own account".into()));
    }

    managed_target(&state, auth.role, auth.business_id, user_id).await?;
    if !UserRepository::new(state.pool.clone())
        .delete_user(user_id)
        .await?
    {
        return Err(not_in_business());
    }

    info!(user_id = %user_id, deleted_by = %auth.user_id, "User deleted");
    Ok(Json(SuccessResponse::ok()))
}

/// PUT /api/v1/me/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    request.validate()?;
    check_password_policy(&request.password, state.config.auth.min_password_length)?;

    let password_hash = hash_password(&request.password)?;
    if !UserRepository::new(state.pool.clone())
        .set_password(auth.user_id, &password_hash)
        .await?
    {
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(user_id = %auth.user_id, "Password changed");
    Ok(Json(SuccessResponse::ok()))
}

/// PUT /api/v1/me/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    request.validate()?;

    let profile = ProfileRepository::new(state.pool.clone())
        .update_profile(
            auth.user_id,
            request.full_name.trim(),
            &normalize_email(&request.email),
        )
        .await
        .map_err(email_taken)?;

    info!(user_id = %auth.user_id, "Profile updated");
    Ok(Json(profile.into()))
}
