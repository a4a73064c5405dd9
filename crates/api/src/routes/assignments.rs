//! Employee-facing assignment routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::assignment::{AssignedJob, RespondToAssignmentRequest};
use domain::models::role::sets;
use domain::models::JobAssignment;
use domain::services::{fan_out, response_notifications};
use persistence::repositories::{
    AssignmentRepository, JobRepository, NotificationRepository, ProfileRepository,
};
use serde::Serialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, Caller};
use crate::middleware::metrics::record_notifications_sent;

#[derive(Debug, Serialize)]
pub struct AssignedJobsResponse {
    pub data: Vec<AssignedJob>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondResponse {
    pub success: bool,
    pub assignment: JobAssignment,
}

/// The caller's assignments with job details, newest first.
///
/// GET /api/v1/me/jobs
pub async fn list_assigned_jobs(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<AssignedJobsResponse>, ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;

    let data = AssignmentRepository::new(state.pool.clone())
        .list_for_employee(auth.user_id)
        .await?
        .into_iter()
        .map(AssignedJob::from)
        .collect();

    Ok(Json(AssignedJobsResponse { data }))
}

/// Accept or decline an assignment, then tell the business's managers.
///
/// POST /api/v1/me/assignments/:assignment_id/response
pub async fn respond_to_assignment(
    State(state): State<AppState>,
    caller: Caller,
    Path(assignment_id): Path<i64>,
    ApiJson(request): ApiJson<RespondToAssignmentRequest>,
) -> Result<Json<RespondResponse>, ApiError> {
    let auth = caller.authorize(sets::ANY_MEMBER)?;
    if !request.status.is_response() {
        return Err(ApiError::Validation(
            "Status must be accepted or declined".into(),
        ));
    }

    let assignment: JobAssignment = AssignmentRepository::new(state.pool.clone())
        .respond(assignment_id, auth.user_id, request.status.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".into()))?
        .into();

    info!(
        assignment_id,
        job_id = %assignment.job_id,
        employee_id = %auth.user_id,
        status = %assignment.status,
        "Assignment response recorded"
    );

    let job = JobRepository::new(state.pool.clone())
        .find_in_business(assignment.job_id, auth.business_id)
        .await?;
    if let Some(job) = job {
        let managers = ProfileRepository::new(state.pool.clone())
            .manager_ids(auth.business_id)
            .await?;
        let responder = caller
            .profile
            .as_ref()
            .map(|p| p.email.clone().unwrap_or_else(|| p.display_name()))
            .unwrap_or_default();

        let sink = NotificationRepository::new(state.pool.clone());
        let notified = fan_out(
            &sink,
            response_notifications(&managers, &responder, assignment.status, &job.title),
        )
        .await;
        record_notifications_sent(notified);
    }

    Ok(Json(RespondResponse {
        success: true,
        assignment,
    }))
}
