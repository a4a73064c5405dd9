//! Job and assignment entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::assignment::AssignedJob;
use domain::models::job::{JobAssignee, JobDetail};
use domain::models::AssignmentStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for assignment_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "assignment_status", rename_all = "lowercase")]
pub enum AssignmentStatusDb {
    Pending,
    Accepted,
    Declined,
}

impl From<AssignmentStatusDb> for AssignmentStatus {
    fn from(db: AssignmentStatusDb) -> Self {
        match db {
            AssignmentStatusDb::Pending => AssignmentStatus::Pending,
            AssignmentStatusDb::Accepted => AssignmentStatus::Accepted,
            AssignmentStatusDb::Declined => AssignmentStatus::Declined,
        }
    }
}

impl From<AssignmentStatus> for AssignmentStatusDb {
    fn from(status: AssignmentStatus) -> Self {
        match status {
            AssignmentStatus::Pending => AssignmentStatusDb::Pending,
            AssignmentStatus::Accepted => AssignmentStatusDb::Accepted,
            AssignmentStatus::Declined => AssignmentStatusDb::Declined,
        }
    }
}

/// Database row mapping for the jobs table.
#[derive(Debug, Clone, FromRow)]
pub struct JobEntity {
    pub id: Uuid,
    pub business_id: Uuid,
    pub author_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<JobEntity> for domain::models::Job {
    fn from(entity: JobEntity) -> Self {
        Self {
            id: entity.id,
            business_id: entity.business_id,
            author_id: entity.author_id,
            title: entity.title,
            description: entity.description,
            location: entity.location,
            status: entity.status,
            completed_at: entity.completed_at,
            created_at: entity.created_at,
        }
    }
}

/// Job row joined with the author's name.
#[derive(Debug, Clone, FromRow)]
pub struct JobWithAuthorEntity {
    #[sqlx(flatten)]
    pub job: JobEntity,
    pub author_name: Option<String>,
}

impl JobWithAuthorEntity {
    /// Combines the row with its assignees.
    pub fn into_detail(self, assignments: Vec<JobAssignee>) -> JobDetail {
        JobDetail {
            job: self.job.into(),
            author_name: self.author_name,
            assignments,
        }
    }
}

/// Database row mapping for the job_assignments table.
#[derive(Debug, Clone, FromRow)]
pub struct JobAssignmentEntity {
    pub id: i64,
    pub job_id: Uuid,
    pub employee_id: Uuid,
    pub status: AssignmentStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobAssignmentEntity> for domain::models::JobAssignment {
    fn from(entity: JobAssignmentEntity) -> Self {
        Self {
            id: entity.id,
            job_id: entity.job_id,
            employee_id: entity.employee_id,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Assignee row for job listings.
#[derive(Debug, Clone, FromRow)]
pub struct JobAssigneeEntity {
    pub job_id: Uuid,
    pub employee_id: Uuid,
    pub full_name: Option<String>,
    pub status: AssignmentStatusDb,
}

impl From<JobAssigneeEntity> for JobAssignee {
    fn from(entity: JobAssigneeEntity) -> Self {
        Self {
            employee_id: entity.employee_id,
            full_name: entity.full_name,
            status: entity.status.into(),
        }
    }
}

/// Assignment joined with its job, for the employee's job list.
#[derive(Debug, Clone, FromRow)]
pub struct AssignedJobEntity {
    pub assignment_id: i64,
    pub status: AssignmentStatusDb,
    pub assigned_at: DateTime<Utc>,
    pub job_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_status: String,
    pub author_name: Option<String>,
}

impl From<AssignedJobEntity> for AssignedJob {
    fn from(entity: AssignedJobEntity) -> Self {
        Self {
            assignment_id: entity.assignment_id,
            status: entity.status.into(),
            assigned_at: entity.assigned_at,
            job_id: entity.job_id,
            title: entity.title,
            description: entity.description,
            location: entity.location,
            job_status: entity.job_status,
            author_name: entity.author_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_status_round_trip() {
        for status in [
            AssignmentStatus::Pending,
            AssignmentStatus::Accepted,
            AssignmentStatus::Declined,
        ] {
            let db: AssignmentStatusDb = status.into();
            assert_eq!(AssignmentStatus::from(db), status);
        }
    }

    #[test]
    fn test_job_with_author_into_detail() {
        let entity = JobWithAuthorEntity {
            job: JobEntity {
                id: Uuid::new_v4(),
                business_id: Uuid::new_v4(),
                author_id: None,
                title: "Fix roof".to_string(),
                description: None,
                location: Some("Depot".to_string()),
                status: "started".to_string(),
                completed_at: None,
                created_at: Utc::now(),
            },
            author_name: Some("Olivia".to_string()),
        };
        let detail = entity.into_detail(vec![]);
        assert_eq!(detail.job.title, "Fix roof");
        assert_eq!(detail.author_name.as_deref(), Some("Olivia"));
        assert!(detail.assignments.is_empty());
    }
}
