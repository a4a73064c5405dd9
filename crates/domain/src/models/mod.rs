//! Domain models for Crewtrack.

pub mod assignment;
pub mod business;
pub mod dashboard;
pub mod job;
pub mod message;
pub mod notification;
pub mod profile;
pub mod role;
pub mod timesheet;
pub mod user;

pub use assignment::{AssignmentStatus, JobAssignment};
pub use business::Business;
pub use job::Job;
pub use message::Message;
pub use notification::{NewNotification, Notification, NotificationKind};
pub use profile::Profile;
pub use role::Role;
pub use timesheet::{Coordinates, Location, Timesheet, TimesheetStatus};
pub use user::User;
