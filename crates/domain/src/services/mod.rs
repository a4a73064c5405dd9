//! Domain services for Crewtrack.
//!
//! Services contain business logic that operates on domain models. Storage
//! is reached through the traits defined here and implemented by the
//! persistence crate.

pub mod access;
pub mod assignment;
pub mod clock;
pub mod notification;

pub use access::{authorize, AccessDenied, Authorized};
pub use assignment::{reconcile_assignments, AssignmentDiff, AssignmentStore, ReconcileOutcome};
pub use clock::{clock_in, clock_out, record_location, ClockError, ClockStore};
pub use notification::{
    assignment_notifications, fan_out, response_notifications, NotificationSink,
};
