//! Onboarding for invited employees.

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::password::check_password_confirmation;

use super::auth::AuthResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::middleware::metrics::record_auth_event;
use crate::services::auth::AuthService;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteOnboardingRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

impl CompleteOnboardingRequest {
    /// Runs every check that needs no database.
    pub fn check(&self, min_password_length: usize) -> Result<(), ApiError> {
        if self.token.trim().is_empty() {
            return Err(ApiError::Validation("Onboarding token is required".into()));
        }
        check_password_confirmation(&self.password, &self.confirm_password, min_password_length)?;
        Ok(())
    }
}

/// POST /api/v1/onboarding
pub async fn complete_onboarding(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CompleteOnboardingRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let min_length = state.config.auth.min_password_length;
    request.check(min_length)?;

    let result = AuthService::new(state.pool.clone(), state.signer.clone(), min_length)
        .complete_onboarding(request.token.trim(), &request.password)
        .await?;

    record_auth_event("onboarding");
    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str, confirm: &str) -> CompleteOnboardingRequest {
        CompleteOnboardingRequest {
            token: "abc123".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request("secret1", "secret1").check(6).is_ok());
    }

    #[test]
    fn test_mismatched_passwords() {
        let err = request("secret1", "secret2").check(6).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Passwords do not match"));
    }

    #[test]
    fn test_short_password() {
        let err = request("12345", "12345").check(6).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_missing_token() {
        let mut req = request("secret1", "secret1");
        req.token = "  ".to_string();
        assert!(req.check(6).is_err());
    }
}
