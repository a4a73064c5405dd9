//! Job assignment repository.

use async_trait::async_trait;
use domain::services::{AssignmentDiff, AssignmentStore};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AssignedJobEntity, AssignmentStatusDb, JobAssigneeEntity, JobAssignmentEntity};
use crate::metrics::QueryTimer;

/// Repository for job assignments.
#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Assignees with names for a batch of jobs.
    pub async fn assignees_for_jobs(
        &self,
        job_ids: &[Uuid],
    ) -> Result<Vec<JobAssigneeEntity>, sqlx::Error> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_assignees_for_jobs");
        let result = sqlx::query_as::<_, JobAssigneeEntity>(
            r#"
            SELECT ja.job_id, ja.employee_id, p.full_name, ja.status
            FROM job_assignments ja
            JOIN profiles p ON p.id = ja.employee_id
            WHERE ja.job_id = ANY($1)
            ORDER BY ja.created_at
            "#,
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// The employee's assignments joined with their jobs, newest first.
    pub async fn list_for_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<AssignedJobEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_assignments_for_employee");
        let result = sqlx::query_as::<_, AssignedJobEntity>(
            r#"
            SELECT
                ja.id AS assignment_id, ja.status, ja.created_at AS assigned_at,
                j.id AS job_id, j.title, j.description, j.location,
                j.status AS job_status,
                a.full_name AS author_name
            FROM job_assignments ja
            JOIN jobs j ON j.id = ja.job_id
            LEFT JOIN profiles a ON a.id = j.author_id
            WHERE ja.employee_id = $1
            ORDER BY ja.created_at DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Records the employee's answer. `None` when the assignment does not
    /// exist or belongs to someone else.
    pub async fn respond(
        &self,
        assignment_id: i64,
        employee_id: Uuid,
        status: AssignmentStatusDb,
    ) -> Result<Option<JobAssignmentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("respond_to_assignment");
        let result = sqlx::query_as::<_, JobAssignmentEntity>(
            r#"
            UPDATE job_assignments
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND employee_id = $2
            RETURNING id, job_id, employee_id, status, created_at, updated_at
            "#,
        )
        .bind(assignment_id)
        .bind(employee_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }
}

#[async_trait]
impl AssignmentStore for AssignmentRepository {
    type Error = sqlx::Error;

    async fn current_assignees(&self, job_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("current_assignees");
        let result: Result<Vec<(Uuid,)>, sqlx::Error> =
            sqlx::query_as("SELECT employee_id FROM job_assignments WHERE job_id = $1")
                .bind(job_id)
                .fetch_all(&self.pool)
                .await;
        timer
            .finish(result)
            .map(|rows| rows.into_iter().map(|(id,)| id).collect())
    }

    async fn apply_diff(&self, job_id: Uuid, diff: &AssignmentDiff) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("apply_assignment_diff");
        let mut tx = self.pool.begin().await?;

        if !diff.to_remove.is_empty() {
            sqlx::query("DELETE FROM job_assignments WHERE job_id = $1 AND employee_id = ANY($2)")
                .bind(job_id)
                .bind(&diff.to_remove)
                .execute(&mut *tx)
                .await?;
        }

        if !diff.to_add.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO job_assignments (job_id, employee_id)
                SELECT $1, UNNEST($2::uuid[])
                ON CONFLICT (job_id, employee_id) DO NOTHING
                "#,
            )
            .bind(job_id)
            .bind(&diff.to_add)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(())
    }
}
