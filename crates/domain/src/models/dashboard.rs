//! Owner/admin dashboard view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A clocked-in worker with their latest position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorker {
    pub timesheet_id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub clock_in: DateTime<Utc>,
    pub last_lat: Option<f64>,
    pub last_lng: Option<f64>,
    pub last_ping_at: Option<DateTime<Utc>>,
    pub ping_overdue: bool,
}

/// Business header shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBusiness {
    pub id: Uuid,
    pub name: String,
    pub invite_code: String,
}

/// Dashboard payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub business: DashboardBusiness,
    pub employee_count: i64,
    pub open_jobs: i64,
    pub active_workers: Vec<ActiveWorker>,
}
