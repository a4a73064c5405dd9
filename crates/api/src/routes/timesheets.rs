//! Clock-in/out and location ping routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::role::sets;
use domain::models::timesheet::{
    is_ping_overdue, ActiveTimesheetResponse, ClockInResponse, ClockOutResponse, PositionRequest,
};
use domain::models::{Location, Timesheet};
use domain::services::{clock_in as open_shift, clock_out as close_shift, record_location as ping};
use persistence::repositories::TimesheetRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, Caller};
use crate::middleware::metrics::record_clock_event;

/// POST /api/v1/timesheets/clock-in
///
/// 409 when the caller already has an active timesheet.
pub async fn clock_in(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(position): ApiJson<PositionRequest>,
) -> Result<(StatusCode, Json<ClockInResponse>), ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;
    let store = TimesheetRepository::new(state.pool.clone());

    let timesheet = open_shift(&store, &auth, position)
        .await
        .inspect_err(|_| record_clock_event("clock_in_rejected"))?;
    record_clock_event("clock_in");

    Ok((
        StatusCode::CREATED,
        Json(ClockInResponse {
            success: true,
            timesheet_id: timesheet.id,
            ping_interval_secs: state.config.tracking.ping_interval_secs,
        }),
    ))
}

/// POST /api/v1/timesheets/:timesheet_id/clock-out
pub async fn clock_out(
    State(state): State<AppState>,
    caller: Caller,
    Path(timesheet_id): Path<Uuid>,
    ApiJson(position): ApiJson<PositionRequest>,
) -> Result<Json<ClockOutResponse>, ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;
    let store = TimesheetRepository::new(state.pool.clone());

    let timesheet = close_shift(&store, &auth, timesheet_id, position).await?;
    record_clock_event("clock_out");

    Ok(Json(ClockOutResponse {
        success: true,
        timesheet,
    }))
}

/// POST /api/v1/timesheets/:timesheet_id/locations
pub async fn record_location(
    State(state): State<AppState>,
    caller: Caller,
    Path(timesheet_id): Path<Uuid>,
    ApiJson(position): ApiJson<PositionRequest>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;
    let store = TimesheetRepository::new(state.pool.clone());

    let location = ping(&store, &auth, timesheet_id, position).await?;
    record_clock_event("ping");

    Ok((StatusCode::CREATED, Json(location)))
}

/// The caller's open timesheet, with ping health.
///
/// GET /api/v1/timesheets/active
pub async fn active_timesheet(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ActiveTimesheetResponse>, ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;
    let repo = TimesheetRepository::new(state.pool.clone());
    let tracking = &state.config.tracking;

    let Some(timesheet) = repo.find_active(auth.user_id).await?.map(Timesheet::from) else {
        return Ok(Json(ActiveTimesheetResponse {
            timesheet: None,
            last_ping_at: None,
            ping_overdue: false,
            ping_interval_secs: tracking.ping_interval_secs,
        }));
    };

    let last_ping_at = repo.last_ping_at(timesheet.id).await?;
    let ping_overdue = is_ping_overdue(
        timesheet.clock_in,
        last_ping_at,
        Utc::now(),
        tracking.ping_interval_secs,
        tracking.ping_grace_secs,
    );

    Ok(Json(ActiveTimesheetResponse {
        timesheet: Some(timesheet),
        last_ping_at,
        ping_overdue,
        ping_interval_secs: tracking.ping_interval_secs,
    }))
}
