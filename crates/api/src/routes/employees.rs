//! Employee monitoring for owners and admins.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::profile::{EmployeeActivity, EmployeeSummary};
use domain::models::role::sets;
use domain::models::{Location, Profile, Role, Timesheet};
use persistence::repositories::{ProfileRepository, TimesheetRepository};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Caller;

#[derive(Debug, Serialize)]
pub struct ListEmployeesResponse {
    pub data: Vec<EmployeeSummary>,
}

/// Roles a manager sees in the staff list. Owners also see their admins.
fn visible_roles(caller: Role) -> &'static [Role] {
    match caller {
        Role::Owner => &[Role::Admin, Role::Employee],
        _ => &[Role::Employee],
    }
}

/// GET /api/v1/employees
pub async fn list_employees(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ListEmployeesResponse>, ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;

    let data = ProfileRepository::new(state.pool.clone())
        .list_members(auth.business_id, visible_roles(auth.role))
        .await?
        .into_iter()
        .map(EmployeeSummary::from)
        .collect();

    Ok(Json(ListEmployeesResponse { data }))
}

/// Timesheets and location trail of one member, newest first.
///
/// GET /api/v1/employees/:user_id/activity
pub async fn employee_activity(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<Uuid>,
) -> Result<Json<EmployeeActivity>, ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;

    let profile: Profile = ProfileRepository::new(state.pool.clone())
        .find_in_business(user_id, auth.business_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?
        .into();

    let limit = state.config.limits.max_activity_rows;
    let repo = TimesheetRepository::new(state.pool.clone());
    let timesheets = repo
        .list_for_user(user_id, limit)
        .await?
        .into_iter()
        .map(Timesheet::from)
        .collect();
    let locations = repo
        .locations_for_user(user_id, limit)
        .await?
        .into_iter()
        .map(Location::from)
        .collect();

    Ok(Json(EmployeeActivity {
        profile,
        timesheets,
        locations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_roles() {
        assert_eq!(visible_roles(Role::Owner), &[Role::Admin, Role::Employee]);
        assert_eq!(visible_roles(Role::Admin), &[Role::Employee]);
    }
}
