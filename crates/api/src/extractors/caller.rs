//! The authenticated user together with their profile.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::{Profile, Role};
use domain::services::{authorize, Authorized};
use persistence::repositories::ProfileRepository;
use uuid::Uuid;

use super::UserAuth;
use crate::app::AppState;
use crate::error::ApiError;

/// Caller of a protected route. The profile is loaded once per request and
/// fed to the access guard by [`Caller::authorize`].
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: Uuid,
    pub profile: Option<Profile>,
}

impl Caller {
    /// Runs the access guard for `allowed` roles.
    pub fn authorize(&self, allowed: &[Role]) -> Result<Authorized, ApiError> {
        authorize(self.profile.as_ref(), allowed, None).map_err(|denied| {
            tracing::warn!(user_id = %self.user_id, reason = %denied, "Access denied");
            denied.into()
        })
    }

    pub fn require_profile(&self) -> Result<&Profile, ApiError> {
        self.profile
            .as_ref()
            .ok_or_else(|| ApiError::NotFound("Profile not found".into()))
    }

    /// Loads the profile for an already authenticated user.
    pub async fn load(state: &AppState, auth: &UserAuth) -> Result<Self, ApiError> {
        let profile = ProfileRepository::new(state.pool.clone())
            .find_by_id(auth.user_id)
            .await?
            .map(Profile::from);

        Ok(Self {
            user_id: auth.user_id,
            profile,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = UserAuth::from_request_parts(parts, state).await?;
        Self::load(state, &auth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::role::sets;

    fn caller(role: Option<Role>, business_id: Option<Uuid>) -> Caller {
        let id = Uuid::new_v4();
        Caller {
            user_id: id,
            profile: Some(Profile {
                id,
                business_id,
                role,
                full_name: Some("Casey".to_string()),
                email: Some("casey@example.com".to_string()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }),
        }
    }

    #[test]
    fn test_employee_denied_manager_action() {
        let err = caller(Some(Role::Employee), Some(Uuid::new_v4()))
            .authorize(sets::MANAGERS)
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_admin_allowed_manager_action() {
        let business_id = Uuid::new_v4();
        let authorized = caller(Some(Role::Admin), Some(business_id))
            .authorize(sets::MANAGERS)
            .unwrap();
        assert_eq!(authorized.business_id, business_id);
        assert_eq!(authorized.role, Role::Admin);
    }

    #[test]
    fn test_missing_profile() {
        let caller = Caller {
            user_id: Uuid::new_v4(),
            profile: None,
        };
        assert!(matches!(caller.authorize(sets::ANY_MEMBER), Err(ApiError::Forbidden(_))));
        assert!(matches!(caller.require_profile(), Err(ApiError::NotFound(_))));
    }
}
