//! Job assignment domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// State of an assignment from the employee's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Declined,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Declined => "declined",
        }
    }

    /// Employees may only answer with accepted or declined.
    pub fn is_response(&self) -> bool {
        !matches!(self, AssignmentStatus::Pending)
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AssignmentStatus::Pending),
            "accepted" => Ok(AssignmentStatus::Accepted),
            "declined" => Ok(AssignmentStatus::Declined),
            _ => Err(format!("Invalid assignment status: {}", s)),
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Link between a job and an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAssignment {
    pub id: i64,
    pub job_id: Uuid,
    pub employee_id: Uuid,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload replacing a job's assignee set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentsRequest {
    pub employee_ids: Vec<Uuid>,
}

/// Current assignees of a job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAssignmentsResponse {
    pub job_id: Uuid,
    pub employee_ids: Vec<Uuid>,
}

/// Result of reconciling a job's assignees.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentsResponse {
    pub success: bool,
    pub added: Vec<Uuid>,
    pub removed: Vec<Uuid>,
}

/// Request payload for an employee answering an assignment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondToAssignmentRequest {
    pub status: AssignmentStatus,
}

/// An assignment as seen by the assigned employee.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedJob {
    pub assignment_id: i64,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub job_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub job_status: String,
    pub author_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("accepted".parse::<AssignmentStatus>().unwrap(), AssignmentStatus::Accepted);
        assert_eq!("DECLINED".parse::<AssignmentStatus>().unwrap(), AssignmentStatus::Declined);
        assert!("maybe".parse::<AssignmentStatus>().is_err());
    }

    #[test]
    fn test_is_response() {
        assert!(AssignmentStatus::Accepted.is_response());
        assert!(AssignmentStatus::Declined.is_response());
        assert!(!AssignmentStatus::Pending.is_response());
    }

    #[test]
    fn test_respond_request_deserialization() {
        let req: RespondToAssignmentRequest =
            serde_json::from_str(r#"{"status": "declined"}"#).unwrap();
        assert_eq!(req.status, AssignmentStatus::Declined);
        assert!(serde_json::from_str::<RespondToAssignmentRequest>(r#"{"status": "later"}"#).is_err());
    }
}
