//! Assignment diffing and reconciliation.
//!
//! Updating a job's assignees is a set replacement: the caller sends the
//! desired set, [`AssignmentDiff::compute`] derives what to remove and add,
//! the store applies both atomically, and only the added employees are
//! notified.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::notification::{assignment_notifications, fan_out, NotificationSink};

/// Difference between a job's current and desired assignees.
///
/// Both lists are sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentDiff {
    pub to_add: Vec<Uuid>,
    pub to_remove: Vec<Uuid>,
}

impl AssignmentDiff {
    /// `to_add = desired \ current`, `to_remove = current \ desired`.
    pub fn compute(current: &[Uuid], desired: &[Uuid]) -> Self {
        let current: BTreeSet<Uuid> = current.iter().copied().collect();
        let desired: BTreeSet<Uuid> = desired.iter().copied().collect();

        Self {
            to_add: desired.difference(&current).copied().collect(),
            to_remove: current.difference(&desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Storage for job assignments.
#[async_trait::async_trait]
pub trait AssignmentStore: Send + Sync {
    type Error: Send;

    /// Employee ids currently assigned to the job.
    async fn current_assignees(&self, job_id: Uuid) -> Result<Vec<Uuid>, Self::Error>;

    /// Deletes `to_remove` and inserts `to_add` as pending, both or neither.
    async fn apply_diff(&self, job_id: Uuid, diff: &AssignmentDiff) -> Result<(), Self::Error>;
}

/// Outcome of [`reconcile_assignments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub diff: AssignmentDiff,
    pub notified: usize,
}

/// Replaces a job's assignees with `desired` and notifies added employees.
///
/// Storage errors abort before any notification is sent. Notification
/// failures never fail the call.
pub async fn reconcile_assignments<S, N>(
    store: &S,
    sink: &N,
    job_id: Uuid,
    job_title: &str,
    desired: &[Uuid],
) -> Result<ReconcileOutcome, S::Error>
where
    S: AssignmentStore + ?Sized,
    N: NotificationSink + ?Sized,
{
    let current = store.current_assignees(job_id).await?;
    let diff = AssignmentDiff::compute(&current, desired);

    if !diff.is_empty() {
        store.apply_diff(job_id, &diff).await?;
    }

    tracing::info!(
        job_id = %job_id,
        added = diff.to_add.len(),
        removed = diff.to_remove.len(),
        "Assignments reconciled"
    );

    let notified = fan_out(sink, assignment_notifications(job_title, &diff.to_add)).await;

    Ok(ReconcileOutcome { diff, notified })
}
