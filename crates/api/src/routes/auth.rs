//! Authentication routes: signup, login, token refresh, logout and the
//! caller's own profile.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::{Profile, Role};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, Caller};
use crate::middleware::metrics::record_auth_event;
use crate::services::auth::{AuthResult, AuthService, Signup, TokenPair};

/// Request body for signup.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub full_name: String,

    pub role: Role,

    #[validate(length(max = 200, message = "Business name must be at most 200 characters"))]
    pub business_name: Option<String>,

    pub invite_code: Option<String>,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for refresh and logout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token information in response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl From<TokenPair> for TokensResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer",
            expires_in: pair.expires_in,
        }
    }
}

/// Response body for signup, login and onboarding.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub tokens: TokensResponse,
    pub profile: Profile,
    pub redirect: &'static str,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        let redirect = result.redirect();
        Self {
            tokens: result.tokens.into(),
            profile: result.profile,
            redirect,
        }
    }
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        state.pool.clone(),
        state.signer.clone(),
        state.config.auth.min_password_length,
    )
}

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let result = auth_service(&state)
        .signup(Signup {
            email: &request.email,
            password: &request.password,
            full_name: &request.full_name,
            role: request.role,
            business_name: request.business_name.as_deref(),
            invite_code: request.invite_code.as_deref(),
        })
        .await?;

    record_auth_event("signup");
    Ok((StatusCode::CREATED, Json(result.into())))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let result = auth_service(&state)
        .login(&request.email, &request.password)
        .await
        .inspect_err(|_| record_auth_event("login_failed"))?;

    record_auth_event("login");
    Ok(Json(result.into()))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<Json<TokensResponse>, ApiError> {
    let tokens = auth_service(&state).refresh(&request.refresh_token).await?;
    record_auth_event("refresh");
    Ok(Json(tokens.into()))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<StatusCode, ApiError> {
    auth_service(&state).logout(&request.refresh_token).await?;
    record_auth_event("logout");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(caller: Caller) -> Result<Json<Profile>, ApiError> {
    Ok(Json(caller.require_profile()?.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_request() -> SignupRequest {
        SignupRequest {
            email: "owner@example.com".to_string(),
            password: "secret1".to_string(),
            full_name: "Olive Owner".to_string(),
            role: Role::Owner,
            business_name: Some("Olive Landscaping".to_string()),
            invite_code: None,
        }
    }

    #[test]
    fn test_signup_request_valid() {
        assert!(signup_request().validate().is_ok());
    }

    #[test]
    fn test_signup_request_short_password() {
        let request = SignupRequest {
            password: "12345".to_string(),
            ..signup_request()
        };
        let err: ApiError = request.validate().unwrap_err().into();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("at least 6")));
    }

    #[test]
    fn test_signup_request_blank_name() {
        let request = SignupRequest {
            full_name: "   ".to_string(),
            ..signup_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_signup_request_deserializes_role() {
        let request: SignupRequest = serde_json::from_str(
            r#"{"email":"e@example.com","password":"secret1","fullName":"Eve","role":"employee","inviteCode":"abc-def-ghj"}"#,
        )
        .unwrap();
        assert_eq!(request.role, Role::Employee);
        assert_eq!(request.invite_code.as_deref(), Some("abc-def-ghj"));
    }

    #[test]
    fn test_login_request_invalid_email() {
        let request = LoginRequest {
            email: "nope".to_string(),
            password: "secret1".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_tokens_response_serialization() {
        let response = TokensResponse::from(TokenPair {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_in: 3600,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["accessToken"], "access");
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 3600);
    }
}
