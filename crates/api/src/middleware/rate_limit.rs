//! Per-user rate limiting.
//!
//! Runs after [`require_user_auth`](super::require_user_auth) so the caller's
//! id is in the request extensions. Unauthenticated routes are not limited
//! here.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use std::num::NonZeroU32;
use uuid::Uuid;

use super::user_auth::UserAuth;
use crate::app::AppState;
use crate::error::ApiError;

/// Token buckets keyed by user id.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<Uuid>,
    clock: DefaultClock,
    per_minute: NonZeroU32,
}

impl RateLimiterState {
    /// `None` when `per_minute` is zero, which disables limiting.
    pub fn new(per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            clock: DefaultClock::default(),
            per_minute,
        })
    }

    /// `Err(retry_after_secs)` when the user is over quota.
    pub fn check(&self, user_id: Uuid) -> Result<(), u64> {
        self.limiter.check_key(&user_id).map_err(|not_until| {
            not_until
                .wait_time_from(self.clock.now())
                .as_secs()
                .max(1)
        })
    }

    pub fn per_minute(&self) -> u32 {
        self.per_minute.get()
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("per_minute", &self.per_minute)
            .field("tracked_users", &self.limiter.len())
            .finish()
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (Some(limiter), Some(auth)) = (
        state.rate_limiter.as_ref(),
        req.extensions().get::<UserAuth>(),
    ) else {
        return next.run(req).await;
    };

    match limiter.check(auth.user_id) {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::debug!(user_id = %auth.user_id, retry_after, "Rate limited");
            let mut response = ApiError::RateLimited.into_response();
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables_limiter() {
        assert!(RateLimiterState::new(0).is_none());
    }

    #[test]
    fn test_limit_exhaustion() {
        let state = RateLimiterState::new(2).unwrap();
        let user = Uuid::new_v4();

        assert!(state.check(user).is_ok());
        assert!(state.check(user).is_ok());
        let retry_after = state.check(user).unwrap_err();
        assert!(retry_after >= 1);
    }

    #[test]
    fn test_users_are_independent() {
        let state = RateLimiterState::new(1).unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(state.check(a).is_ok());
        assert!(state.check(a).is_err());
        assert!(state.check(b).is_ok());
    }

    #[test]
    fn test_debug_output() {
        let state = RateLimiterState::new(60).unwrap();
        let debug = format!("{:?}", state);
        assert!(debug.contains("per_minute"));
    }
}
