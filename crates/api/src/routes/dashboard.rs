//! Owner/admin dashboard.

use axum::{extract::State, Json};
use chrono::Utc;
use domain::models::dashboard::{DashboardBusiness, DashboardResponse};
use domain::models::role::sets;
use domain::models::Role;
use persistence::repositories::{BusinessRepository, JobRepository, ProfileRepository, TimesheetRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

/// Business summary plus everyone currently clocked in with their last
/// known position.
///
/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<DashboardResponse>, ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;

    let business = BusinessRepository::new(state.pool.clone())
        .find_by_id(auth.business_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Business not found".into()))?;

    let employee_count = ProfileRepository::new(state.pool.clone())
        .count_by_role(auth.business_id, Role::Employee)
        .await?;
    let open_jobs = JobRepository::new(state.pool.clone())
        .count_open(auth.business_id)
        .await?;

    let now = Utc::now();
    let tracking = &state.config.tracking;
    let active_workers = TimesheetRepository::new(state.pool.clone())
        .active_workers(auth.business_id)
        .await?
        .into_iter()
        .map(|w| w.into_worker(now, tracking.ping_interval_secs, tracking.ping_grace_secs))
        .collect();

    Ok(Json(DashboardResponse {
        business: DashboardBusiness {
            id: business.id,
            name: business.name,
            invite_code: business.invite_code,
        },
        employee_count,
        open_jobs,
        active_workers,
    }))
}
