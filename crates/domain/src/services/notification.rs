//! Notification fan-out.
//!
//! Builds the in-app notifications for assignment changes and responses and
//! hands them to a [`NotificationSink`]. Delivery is best effort: a failing
//! sink is logged and the triggering operation still succeeds.

use uuid::Uuid;

use crate::models::{AssignmentStatus, NewNotification, NotificationKind};

pub const ASSIGNMENT_TITLE: &str = "New Job Assigned";
pub const ASSIGNMENT_LINK: &str = "/employee/jobs";
pub const RESPONSE_TITLE: &str = "Job Assignment Update";
pub const RESPONSE_LINK: &str = "/dashboard/jobs";

/// Storage for in-app notifications.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    type Error: std::fmt::Display + Send;

    /// Stores all notifications, or none of them.
    async fn deliver(&self, notifications: &[NewNotification]) -> Result<(), Self::Error>;
}

/// One notification per newly assigned employee.
pub fn assignment_notifications(job_title: &str, employees: &[Uuid]) -> Vec<NewNotification> {
    employees
        .iter()
        .map(|&user_id| NewNotification {
            user_id,
            kind: NotificationKind::JobAssignment,
            title: ASSIGNMENT_TITLE.to_string(),
            message: format!("You have been assigned to job: {}", job_title),
            link: Some(ASSIGNMENT_LINK.to_string()),
        })
        .collect()
}

/// One notification per owner/admin when an employee answers an assignment.
pub fn response_notifications(
    managers: &[Uuid],
    responder_email: &str,
    status: AssignmentStatus,
    job_title: &str,
) -> Vec<NewNotification> {
    managers
        .iter()
        .map(|&user_id| NewNotification {
            user_id,
            kind: NotificationKind::JobResponse,
            title: RESPONSE_TITLE.to_string(),
            message: format!("{} has {} the job: {}", responder_email, status, job_title),
            link: Some(RESPONSE_LINK.to_string()),
        })
        .collect()
}

/// Delivers notifications, swallowing failures.
///
/// Returns the number of notifications stored.
pub async fn fan_out<N>(sink: &N, notifications: Vec<NewNotification>) -> usize
where
    N: NotificationSink + ?Sized,
{
    if notifications.is_empty() {
        return 0;
    }

    match sink.deliver(&notifications).await {
        Ok(()) => {
            tracing::debug!(count = notifications.len(), "Notifications delivered");
            notifications.len()
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                count = notifications.len(),
                kind = %notifications[0].kind,
                "Failed to deliver notifications"
            );
            0
        }
    }
}
