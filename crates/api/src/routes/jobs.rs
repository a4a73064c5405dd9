//! Job routes for owners and admins: CRUD, status and assignment
//! reconciliation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::assignment::{
    JobAssignmentsResponse, UpdateAssignmentsRequest, UpdateAssignmentsResponse,
};
use domain::models::job::{
    CreateJobRequest, CreateJobResponse, JobAssignee, JobDetail, ListJobsResponse,
    UpdateJobRequest, UpdateJobStatusRequest,
};
use domain::models::role::sets;
use domain::models::Job;
use domain::services::{
    assignment_notifications, fan_out, reconcile_assignments, AssignmentStore, ReconcileOutcome,
};
use persistence::repositories::{
    AssignmentRepository, JobRepository, NotificationRepository, ProfileRepository,
};
use std::collections::{HashMap, HashSet};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, Caller};
use crate::middleware::metrics::{
    record_assignments_changed, record_job_created, record_notifications_sent,
};

fn job_not_found() -> ApiError {
    ApiError::NotFound("Job not found".into())
}

/// Drops duplicates, keeping first occurrence order.
fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Checks that every id names an employee of the business.
async fn check_assignees(
    state: &AppState,
    business_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, ApiError> {
    let ids = dedup_ids(ids);
    let max = state.config.limits.max_assignees_per_job;
    if ids.len() > max {
        return Err(ApiError::Validation(format!(
            "A job can have at most {} assignees",
            max
        )));
    }
    if ids.is_empty() {
        return Ok(ids);
    }

    let found = ProfileRepository::new(state.pool.clone())
        .count_employees_among(business_id, &ids)
        .await?;
    if found != ids.len() as i64 {
        return Err(ApiError::Validation(
            "All assignees must be employees of your business".into(),
        ));
    }
    Ok(ids)
}

/// Applies the desired assignee set and notifies newly added employees.
async fn reconcile(
    state: &AppState,
    job: &Job,
    desired: &[Uuid],
) -> Result<ReconcileOutcome, ApiError> {
    let store = AssignmentRepository::new(state.pool.clone());
    let sink = NotificationRepository::new(state.pool.clone());

    let outcome = reconcile_assignments(&store, &sink, job.id, &job.title, desired).await?;

    record_assignments_changed(outcome.diff.to_add.len(), outcome.diff.to_remove.len());
    record_notifications_sent(outcome.notified);
    Ok(outcome)
}

async fn with_assignees(
    state: &AppState,
    jobs: Vec<persistence::entities::JobWithAuthorEntity>,
) -> Result<Vec<JobDetail>, ApiError> {
    let ids: Vec<Uuid> = jobs.iter().map(|j| j.job.id).collect();
    let mut by_job: HashMap<Uuid, Vec<JobAssignee>> = HashMap::new();
    for row in AssignmentRepository::new(state.pool.clone())
        .assignees_for_jobs(&ids)
        .await?
    {
        by_job.entry(row.job_id).or_default().push(row.into());
    }

    Ok(jobs
        .into_iter()
        .map(|job| {
            let assignees = by_job.remove(&job.job.id).unwrap_or_default();
            job.into_detail(assignees)
        })
        .collect())
}

/// List the business's jobs, newest first.
///
/// GET /api/v1/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ListJobsResponse>, ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;

    let jobs = JobRepository::new(state.pool.clone())
        .list_with_author(auth.business_id)
        .await?;
    let data = with_assignees(&state, jobs).await?;

    Ok(Json(ListJobsResponse { data }))
}

/// Create a job, optionally with initial assignees.
///
/// POST /api/v1/jobs
pub async fn create_job(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(request): ApiJson<CreateJobRequest>,
) -> Result<(StatusCode, Json<CreateJobResponse>), ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;
    request.validate()?;

    let employee_ids = check_assignees(&state, auth.business_id, &request.employee_ids).await?;

    let job: Job = JobRepository::new(state.pool.clone())
        .create(
            auth.business_id,
            auth.user_id,
            request.title.trim(),
            request.description.as_deref(),
            request.location.as_deref(),
            &employee_ids,
        )
        .await?
        .into();

    info!(
        job_id = %job.id,
        business_id = %auth.business_id,
        author_id = %auth.user_id,
        assignees = employee_ids.len(),
        "Job created"
    );
    record_job_created();

    if !employee_ids.is_empty() {
        let sink = NotificationRepository::new(state.pool.clone());
        let notified = fan_out(&sink, assignment_notifications(&job.title, &employee_ids)).await;
        record_assignments_changed(employee_ids.len(), 0);
        record_notifications_sent(notified);
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateJobResponse {
            success: true,
            job_id: job.id,
        }),
    ))
}

/// GET /api/v1/jobs/:job_id
pub async fn get_job(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobDetail>, ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;

    let job = JobRepository::new(state.pool.clone())
        .find_with_author(job_id, auth.business_id)
        .await?
        .ok_or_else(job_not_found)?;

    let mut details = with_assignees(&state, vec![job]).await?;
    details.pop().map(Json).ok_or_else(job_not_found)
}

/// PUT /api/v1/jobs/:job_id
pub async fn update_job(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateJobRequest>,
) -> Result<Json<Job>, ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;
    request.validate()?;

    let job = JobRepository::new(state.pool.clone())
        .update(
            job_id,
            auth.business_id,
            request.title.trim(),
            request.description.as_deref(),
            request.location.as_deref(),
        )
        .await?
        .ok_or_else(job_not_found)?;

    info!(job_id = %job_id, user_id = %auth.user_id, "Job updated");
    Ok(Json(job.into()))
}

/// PUT /api/v1/jobs/:job_id/status
pub async fn update_job_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateJobStatusRequest>,
) -> Result<Json<Job>, ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;
    request.validate()?;

    let status = request.status.trim();
    let job = JobRepository::new(state.pool.clone())
        .update_status(job_id, auth.business_id, status)
        .await?
        .ok_or_else(job_not_found)?;

    info!(job_id = %job_id, status = %status, "Job status updated");
    Ok(Json(job.into()))
}

/// GET /api/v1/jobs/:job_id/assignments
pub async fn get_job_assignments(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobAssignmentsResponse>, ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;

    JobRepository::new(state.pool.clone())
        .find_in_business(job_id, auth.business_id)
        .await?
        .ok_or_else(job_not_found)?;

    let employee_ids = AssignmentRepository::new(state.pool.clone())
        .current_assignees(job_id)
        .await?;

    Ok(Json(JobAssignmentsResponse {
        job_id,
        employee_ids,
    }))
}

/// Replace the job's assignee set.
///
/// PUT /api/v1/jobs/:job_id/assignments
///
/// Removals and additions commit together; newly added employees are
/// notified afterwards.
pub async fn update_job_assignments(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateAssignmentsRequest>,
) -> Result<Json<UpdateAssignmentsResponse>, ApiError> {
    let auth = caller.authorize(sets::MANAGERS)?;

    let job: Job = JobRepository::new(state.pool.clone())
        .find_in_business(job_id, auth.business_id)
        .await?
        .ok_or_else(job_not_found)?
        .into();

    let desired = check_assignees(&state, auth.business_id, &request.employee_ids).await?;
    let outcome = reconcile(&state, &job, &desired).await?;

    Ok(Json(UpdateAssignmentsResponse {
        success: true,
        added: outcome.diff.to_add,
        removed: outcome.diff.to_remove,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_ids_keeps_first_occurrence() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(dedup_ids(&[a, b, a, b, a]), vec![a, b]);
        assert!(dedup_ids(&[]).is_empty());
    }

    #[test]
    fn test_job_not_found_message() {
        assert!(matches!(job_not_found(), ApiError::NotFound(msg) if msg == "Job not found"));
    }
}
