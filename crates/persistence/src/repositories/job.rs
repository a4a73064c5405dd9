//! Job repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{JobEntity, JobWithAuthorEntity};
use crate::metrics::QueryTimer;

const JOB_COLUMNS: &str =
    "id, business_id, author_id, title, description, location, status, completed_at, created_at";

const JOB_WITH_AUTHOR_SELECT: &str = r#"
    SELECT
        j.id, j.business_id, j.author_id, j.title, j.description, j.location,
        j.status, j.completed_at, j.created_at,
        a.full_name AS author_name
    FROM jobs j
    LEFT JOIN profiles a ON a.id = j.author_id
"#;

/// Repository for job operations. Every lookup is scoped to a business.
#[derive(Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a job together with its initial `pending` assignments.
    ///
    /// Both writes share one transaction, so a failed assignment insert
    /// leaves no job behind.
    pub async fn create(
        &self,
        business_id: Uuid,
        author_id: Uuid,
        title: &str,
        description: Option<&str>,
        location: Option<&str>,
        employee_ids: &[Uuid],
    ) -> Result<JobEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_job");
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, JobEntity>(&format!(
            r#"
            INSERT INTO jobs (business_id, author_id, title, description, location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(business_id)
        .bind(author_id)
        .bind(title)
        .bind(description)
        .bind(location)
        .fetch_one(&mut *tx)
        .await?;

        if !employee_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO job_assignments (job_id, employee_id)
                SELECT $1, UNNEST($2::uuid[])
                ON CONFLICT (job_id, employee_id) DO NOTHING
                "#,
            )
            .bind(job.id)
            .bind(employee_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(job)
    }

    pub async fn find_in_business(
        &self,
        id: Uuid,
        business_id: Uuid,
    ) -> Result<Option<JobEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_job_in_business");
        let result = sqlx::query_as::<_, JobEntity>(&format!(
            "SELECT {} FROM jobs WHERE id = $1 AND business_id = $2",
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    pub async fn find_with_author(
        &self,
        id: Uuid,
        business_id: Uuid,
    ) -> Result<Option<JobWithAuthorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_job_with_author");
        let result = sqlx::query_as::<_, JobWithAuthorEntity>(&format!(
            "{} WHERE j.id = $1 AND j.business_id = $2",
            JOB_WITH_AUTHOR_SELECT
        ))
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Jobs of a business, newest first.
    pub async fn list_with_author(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<JobWithAuthorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_jobs_with_author");
        let result = sqlx::query_as::<_, JobWithAuthorEntity>(&format!(
            "{} WHERE j.business_id = $1 ORDER BY j.created_at DESC",
            JOB_WITH_AUTHOR_SELECT
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    pub async fn update(
        &self,
        id: Uuid,
        business_id: Uuid,
        title: &str,
        description: Option<&str>,
        location: Option<&str>,
    ) -> Result<Option<JobEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_job");
        let result = sqlx::query_as::<_, JobEntity>(&format!(
            r#"
            UPDATE jobs
            SET title = $3, description = $4, location = $5
            WHERE id = $1 AND business_id = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(business_id)
        .bind(title)
        .bind(description)
        .bind(location)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Sets the status label. `completed` stamps `completed_at`; any other
    /// label clears it.
    pub async fn update_status(
        &self,
        id: Uuid,
        business_id: Uuid,
        status: &str,
    ) -> Result<Option<JobEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_job_status");
        let result = sqlx::query_as::<_, JobEntity>(&format!(
            r#"
            UPDATE jobs
            SET status = $3,
                completed_at = CASE
                    WHEN $3 = 'completed' THEN COALESCE(completed_at, NOW())
                    ELSE NULL
                END
            WHERE id = $1 AND business_id = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(id)
        .bind(business_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Jobs not yet marked completed.
    pub async fn count_open(&self, business_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_open_jobs");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            "SELECT COUNT(*) FROM jobs WHERE business_id = $1 AND status <> 'completed'",
        )
        .bind(business_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result).map(|(count,)| count)
    }
}
