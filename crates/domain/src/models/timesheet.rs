//! Timesheet and location domain models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of a timesheet. `Active` may only move to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimesheetStatus {
    Active,
    Completed,
}

impl TimesheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimesheetStatus::Active => "active",
            TimesheetStatus::Completed => "completed",
        }
    }
}

impl FromStr for TimesheetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TimesheetStatus::Active),
            "completed" => Ok(TimesheetStatus::Completed),
            _ => Err(format!("Invalid timesheet status: {}", s)),
        }
    }
}

impl fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A work session of one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_id: Uuid,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub status: TimesheetStatus,
    pub created_at: DateTime<Utc>,
}

impl Timesheet {
    pub fn is_active(&self) -> bool {
        self.status == TimesheetStatus::Active
    }

    /// Worked time so far, or in total once completed.
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        self.clock_out.unwrap_or(now) - self.clock_in
    }
}

/// A recorded position during a timesheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub timesheet_id: Uuid,
    pub user_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub lat: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Body of clock-in, clock-out and location ping requests.
pub type PositionRequest = Coordinates;

/// Response after clocking in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInResponse {
    pub success: bool,
    pub timesheet_id: Uuid,
    pub ping_interval_secs: u64,
}

/// Response after clocking out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutResponse {
    pub success: bool,
    pub timesheet: Timesheet,
}

/// The caller's open timesheet, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimesheetResponse {
    pub timesheet: Option<Timesheet>,
    pub last_ping_at: Option<DateTime<Utc>>,
    pub ping_overdue: bool,
    pub ping_interval_secs: u64,
}

/// Returns true when nothing was heard from an active timesheet for longer
/// than `interval_secs + grace_secs`.
///
/// `last_ping_at` falls back to the clock-in time when no ping was recorded.
pub fn is_ping_overdue(
    clock_in: DateTime<Utc>,
    last_ping_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    interval_secs: u64,
    grace_secs: u64,
) -> bool {
    let last = last_ping_at.map_or(clock_in, |ping| ping.max(clock_in));
    let allowed = Duration::seconds((interval_secs + grace_secs) as i64);
    now - last > allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!("active".parse::<TimesheetStatus>().unwrap(), TimesheetStatus::Active);
        assert_eq!(TimesheetStatus::Completed.to_string(), "completed");
        assert!("paused".parse::<TimesheetStatus>().is_err());
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(51.5, -0.12).validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, 181.0).validate().is_err());
    }

    #[test]
    fn test_position_request_deserialization() {
        let req: PositionRequest = serde_json::from_str(r#"{"lat": 48.1, "lng": 17.1}"#).unwrap();
        assert_eq!(req, Coordinates::new(48.1, 17.1));
    }

    #[test]
    fn test_ping_overdue_uses_clock_in_without_pings() {
        let clock_in = Utc::now() - Duration::minutes(70);
        let now = Utc::now();
        assert!(is_ping_overdue(clock_in, None, now, 3600, 300));
        assert!(!is_ping_overdue(clock_in, None, now, 3600, 900));
    }

    #[test]
    fn test_ping_overdue_with_recent_ping() {
        let now = Utc::now();
        let clock_in = now - Duration::hours(5);
        let last = now - Duration::minutes(10);
        assert!(!is_ping_overdue(clock_in, Some(last), now, 3600, 300));
    }

    #[test]
    fn test_timesheet_duration() {
        let clock_in = Utc::now() - Duration::hours(2);
        let ts = Timesheet {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            clock_in,
            clock_out: Some(clock_in + Duration::minutes(90)),
            status: TimesheetStatus::Completed,
            created_at: clock_in,
        };
        assert_eq!(ts.duration(Utc::now()), Duration::minutes(90));
        assert!(!ts.is_active());
    }
}
