//! Extractor for the authenticated user.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
pub use crate::middleware::user_auth::UserAuth;

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserAuth {
    type Rejection = ApiError;

    /// Reads what [`require_user_auth`](crate::middleware::require_user_auth)
    /// stored; a handler mounted without that layer always rejects.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserAuth>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))
    }
}
