//! Job domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::assignment::AssignmentStatus;

/// Status given to newly created jobs.
pub const DEFAULT_JOB_STATUS: &str = "started";

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Title is required".into());
        return Err(err);
    }
    Ok(())
}

/// A unit of work created by an owner or admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub business_id: Uuid,
    pub author_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Free-text label, `started` on creation.
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a job.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 500, message = "Location must be at most 500 characters"))]
    pub location: Option<String>,

    #[serde(default)]
    pub employee_ids: Vec<Uuid>,
}

/// Response after creating a job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    pub success: bool,
    pub job_id: Uuid,
}

/// Request payload for editing a job.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 500, message = "Location must be at most 500 characters"))]
    pub location: Option<String>,
}

/// Request payload for changing a job's status label.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobStatusRequest {
    #[validate(length(min = 1, max = 50, message = "Status must be 1-50 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub status: String,
}

/// Assignee as shown next to a job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAssignee {
    pub employee_id: Uuid,
    pub full_name: Option<String>,
    pub status: AssignmentStatus,
}

/// A job with its author and assignees.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub author_name: Option<String>,
    pub assignments: Vec<JobAssignee>,
}

/// Response for listing jobs.
#[derive(Debug, Clone, Serialize)]
pub struct ListJobsResponse {
    pub data: Vec<JobDetail>,
}
