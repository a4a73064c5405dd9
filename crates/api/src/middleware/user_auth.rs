//! Bearer token authentication for protected routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use persistence::repositories::UserRepository;
use shared::crypto::sha256_hex;
use shared::jwt::{JwtError, TokenKind, TokenSigner};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated caller, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: Uuid,
    /// Access token id; its hash identifies the session.
    pub jti: String,
}

impl UserAuth {
    /// Checks signature, expiry and token kind.
    pub fn validate(signer: &TokenSigner, token: &str) -> Result<Self, JwtError> {
        let claims = signer.validate(token, TokenKind::Access)?;
        Ok(Self {
            user_id: claims.user_id()?,
            jti: claims.jti,
        })
    }
}

/// Pulls the token out of an `Authorization: Bearer` header.
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects requests without a valid access token whose session is still
/// alive. Logging out or a password reset revokes the session, so a token
/// stops working before it expires.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    {
        Some(token) => token.to_string(),
        None => {
            return ApiError::Unauthorized("Missing or invalid Authorization header".into())
                .into_response()
        }
    };

    let auth = match UserAuth::validate(&state.signer, &token) {
        Ok(auth) => auth,
        Err(e) => {
            tracing::debug!(error = %e, "JWT validation failed");
            return ApiError::Unauthorized("Invalid or expired token".into()).into_response();
        }
    };

    let sessions = UserRepository::new(state.pool.clone());
    match sessions.find_session_by_token(&sha256_hex(&auth.jti)).await {
        Ok(Some(session)) if session.user_id == auth.user_id => {}
        Ok(_) => {
            return ApiError::Unauthorized("Session expired or revoked".into()).into_response()
        }
        Err(e) => return ApiError::from(e).into_response(),
    }

    req.extensions_mut().insert(auth);
    next.run(req).await
}
