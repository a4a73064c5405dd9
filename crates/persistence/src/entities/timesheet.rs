//! Timesheet and location entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::dashboard::ActiveWorker;
use domain::models::TimesheetStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for timesheet_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "timesheet_status", rename_all = "lowercase")]
pub enum TimesheetStatusDb {
    Active,
    Completed,
}

impl From<TimesheetStatusDb> for TimesheetStatus {
    fn from(db: TimesheetStatusDb) -> Self {
        match db {
            TimesheetStatusDb::Active => TimesheetStatus::Active,
            TimesheetStatusDb::Completed => TimesheetStatus::Completed,
        }
    }
}

/// Database row mapping for the timesheets table.
#[derive(Debug, Clone, FromRow)]
pub struct TimesheetEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_id: Uuid,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub status: TimesheetStatusDb,
    pub created_at: DateTime<Utc>,
}

impl From<TimesheetEntity> for domain::models::Timesheet {
    fn from(entity: TimesheetEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            business_id: entity.business_id,
            clock_in: entity.clock_in,
            clock_out: entity.clock_out,
            status: entity.status.into(),
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the locations table.
#[derive(Debug, Clone, FromRow)]
pub struct LocationEntity {
    pub id: i64,
    pub timesheet_id: Uuid,
    pub user_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<LocationEntity> for domain::models::Location {
    fn from(entity: LocationEntity) -> Self {
        Self {
            id: entity.id,
            timesheet_id: entity.timesheet_id,
            user_id: entity.user_id,
            lat: entity.lat,
            lng: entity.lng,
            timestamp: entity.timestamp,
        }
    }
}

/// Active timesheet with its worker and latest ping.
#[derive(Debug, Clone, FromRow)]
pub struct ActiveWorkerEntity {
    pub timesheet_id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub clock_in: DateTime<Utc>,
    pub last_lat: Option<f64>,
    pub last_lng: Option<f64>,
    pub last_ping_at: Option<DateTime<Utc>>,
}

impl ActiveWorkerEntity {
    /// Converts the row, flagging it overdue against the ping schedule.
    pub fn into_worker(self, now: DateTime<Utc>, interval_secs: u64, grace_secs: u64) -> ActiveWorker {
        let ping_overdue = domain::models::timesheet::is_ping_overdue(
            self.clock_in,
            self.last_ping_at,
            now,
            interval_secs,
            grace_secs,
        );
        ActiveWorker {
            timesheet_id: self.timesheet_id,
            user_id: self.user_id,
            full_name: self.full_name,
            clock_in: self.clock_in,
            last_lat: self.last_lat,
            last_lng: self.last_lng,
            last_ping_at: self.last_ping_at,
            ping_overdue,
        }
    }
}
