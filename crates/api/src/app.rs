use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use shared::jwt::{JwtError, TokenSigner};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    assignments, auth, dashboard, employees, health, jobs, messages, notifications, onboarding,
    timesheets, users,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub signer: Arc<TokenSigner>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Result<Self, JwtError> {
        let signer = config.jwt.signer()?;
        let rate_limiter = RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            pool,
            config: Arc::new(config),
            signer: Arc::new(signer),
            rate_limiter,
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Signed-in routes. Auth runs first, then the per-user rate limit.
    let protected_routes = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        // Jobs (owner/admin)
        .route("/api/v1/jobs", get(jobs::list_jobs).post(jobs::create_job))
        .route("/api/v1/jobs/:job_id", get(jobs::get_job).put(jobs::update_job))
        .route("/api/v1/jobs/:job_id/status", put(jobs::update_job_status))
        .route(
            "/api/v1/jobs/:job_id/assignments",
            get(jobs::get_job_assignments).put(jobs::update_job_assignments),
        )
        // Employee job views
        .route("/api/v1/me/jobs", get(assignments::list_assigned_jobs))
        .route(
            "/api/v1/me/assignments/:assignment_id/response",
            post(assignments::respond_to_assignment),
        )
        // Own account
        .route("/api/v1/me/password", put(users::change_password))
        .route("/api/v1/me/profile", put(users::update_profile))
        // Timesheets
        .route("/api/v1/timesheets/clock-in", post(timesheets::clock_in))
        .route("/api/v1/timesheets/active", get(timesheets::active_timesheet))
        .route(
            "/api/v1/timesheets/:timesheet_id/clock-out",
            post(timesheets::clock_out),
        )
        .route(
            "/api/v1/timesheets/:timesheet_id/locations",
            post(timesheets::record_location),
        )
        // Dashboard and monitoring
        .route("/api/v1/dashboard", get(dashboard::dashboard))
        .route("/api/v1/employees", get(employees::list_employees))
        .route(
            "/api/v1/employees/:user_id/activity",
            get(employees::employee_activity),
        )
        // User management
        .route("/api/v1/users/invite", post(users::invite_employee))
        .route("/api/v1/users/admins", post(users::create_admin))
        .route(
            "/api/v1/users/:user_id/password",
            post(users::reset_user_password),
        )
        .route("/api/v1/users/:user_id", axum::routing::delete(users::delete_user))
        // Messages
        .route("/api/v1/messages", post(messages::send_message))
        .route("/api/v1/messages/contacts", get(messages::list_contacts))
        .route("/api/v1/messages/with/:user_id", get(messages::conversation))
        .route("/api/v1/messages/read", post(messages::mark_read))
        .route("/api/v1/messages/unread-count", get(messages::unread_count))
        // Notifications
        .route("/api/v1/notifications", get(notifications::list_notifications))
        .route(
            "/api/v1/notifications/read",
            post(notifications::mark_notifications_read),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let public_routes = Router::new()
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/onboarding", post(onboarding::complete_onboarding))
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Bottom layers run first.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
