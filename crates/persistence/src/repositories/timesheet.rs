//! Timesheet and location repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{Coordinates, Location, Timesheet};
use domain::services::ClockStore;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{ActiveWorkerEntity, LocationEntity, TimesheetEntity};
use crate::metrics::QueryTimer;

const TIMESHEET_COLUMNS: &str = "id, user_id, business_id, clock_in, clock_out, status, created_at";
const LOCATION_COLUMNS: &str = "id, timesheet_id, user_id, lat, lng, timestamp";

/// Repository for timesheets and location pings.
#[derive(Clone)]
pub struct TimesheetRepository {
    pool: PgPool,
}

impl TimesheetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The user's active timesheet, if any.
    pub async fn find_active(&self, user_id: Uuid) -> Result<Option<TimesheetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_timesheet");
        let result = sqlx::query_as::<_, TimesheetEntity>(&format!(
            "SELECT {} FROM timesheets WHERE user_id = $1 AND status = 'active'",
            TIMESHEET_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Time of the most recent location recorded on a timesheet.
    pub async fn last_ping_at(
        &self,
        timesheet_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let timer = QueryTimer::new("last_ping_at");
        let result: Result<(Option<DateTime<Utc>>,), sqlx::Error> =
            sqlx::query_as("SELECT MAX(timestamp) FROM locations WHERE timesheet_id = $1")
                .bind(timesheet_id)
                .fetch_one(&self.pool)
                .await;
        timer.finish(result).map(|(at,)| at)
    }

    /// A user's timesheets, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<TimesheetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_timesheets_for_user");
        let result = sqlx::query_as::<_, TimesheetEntity>(&format!(
            "SELECT {} FROM timesheets WHERE user_id = $1 ORDER BY clock_in DESC LIMIT $2",
            TIMESHEET_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// A user's recorded locations, newest first.
    pub async fn locations_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<LocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_locations_for_user");
        let result = sqlx::query_as::<_, LocationEntity>(&format!(
            "SELECT {} FROM locations WHERE user_id = $1 ORDER BY timestamp DESC, id DESC LIMIT $2",
            LOCATION_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Active timesheets of a business with the latest location of each.
    pub async fn active_workers(
        &self,
        business_id: Uuid,
    ) -> Result<Vec<ActiveWorkerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_workers");
        let result = sqlx::query_as::<_, ActiveWorkerEntity>(
            r#"
            SELECT
                t.id AS timesheet_id, t.user_id, p.full_name, t.clock_in,
                l.lat AS last_lat, l.lng AS last_lng, l.timestamp AS last_ping_at
            FROM timesheets t
            JOIN profiles p ON p.id = t.user_id
            LEFT JOIN LATERAL (
                SELECT lat, lng, timestamp
                FROM locations
                WHERE timesheet_id = t.id
                ORDER BY timestamp DESC, id DESC
                LIMIT 1
            ) l ON true
            WHERE t.business_id = $1 AND t.status = 'active'
            ORDER BY t.clock_in
            "#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }
}

async fn insert_location(
    tx: &mut Transaction<'_, Postgres>,
    timesheet_id: Uuid,
    user_id: Uuid,
    at: Coordinates,
) -> Result<LocationEntity, sqlx::Error> {
    sqlx::query_as::<_, LocationEntity>(&format!(
        "INSERT INTO locations (timesheet_id, user_id, lat, lng) VALUES ($1, $2, $3, $4) RETURNING {}",
        LOCATION_COLUMNS
    ))
    .bind(timesheet_id)
    .bind(user_id)
    .bind(at.lat)
    .bind(at.lng)
    .fetch_one(&mut **tx)
    .await
}

#[async_trait]
impl ClockStore for TimesheetRepository {
    type Error = sqlx::Error;

    async fn open_timesheet(
        &self,
        user_id: Uuid,
        business_id: Uuid,
        at: Coordinates,
    ) -> Result<Option<Timesheet>, sqlx::Error> {
        let timer = QueryTimer::new("open_timesheet");
        let mut tx = self.pool.begin().await?;

        // The partial unique index admits one active row per user.
        let timesheet = sqlx::query_as::<_, TimesheetEntity>(&format!(
            r#"
            INSERT INTO timesheets (user_id, business_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) WHERE status = 'active' DO NOTHING
            RETURNING {}
            "#,
            TIMESHEET_COLUMNS
        ))
        .bind(user_id)
        .bind(business_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(timesheet) = timesheet else {
            timer.record();
            return Ok(None);
        };

        insert_location(&mut tx, timesheet.id, user_id, at).await?;
        tx.commit().await?;
        timer.record();
        Ok(Some(timesheet.into()))
    }

    async fn close_timesheet(
        &self,
        user_id: Uuid,
        timesheet_id: Uuid,
        at: Coordinates,
    ) -> Result<Option<Timesheet>, sqlx::Error> {
        let timer = QueryTimer::new("close_timesheet");
        let mut tx = self.pool.begin().await?;

        let timesheet = sqlx::query_as::<_, TimesheetEntity>(&format!(
            r#"
            UPDATE timesheets
            SET status = 'completed', clock_out = NOW()
            WHERE id = $1 AND user_id = $2 AND status = 'active'
            RETURNING {}
            "#,
            TIMESHEET_COLUMNS
        ))
        .bind(timesheet_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(timesheet) = timesheet else {
            timer.record();
            return Ok(None);
        };

        insert_location(&mut tx, timesheet.id, user_id, at).await?;
        tx.commit().await?;
        timer.record();
        Ok(Some(timesheet.into()))
    }

    async fn append_location(
        &self,
        user_id: Uuid,
        timesheet_id: Uuid,
        at: Coordinates,
    ) -> Result<Option<Location>, sqlx::Error> {
        let timer = QueryTimer::new("append_location");
        let result = sqlx::query_as::<_, LocationEntity>(&format!(
            r#"
            INSERT INTO locations (timesheet_id, user_id, lat, lng)
            SELECT id, user_id, $3, $4
            FROM timesheets
            WHERE id = $1 AND user_id = $2 AND status = 'active'
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        ))
        .bind(timesheet_id)
        .bind(user_id)
        .bind(at.lat)
        .bind(at.lng)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result).map(|row| row.map(Into::into))
    }
}
