//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod business;
pub mod job;
pub mod message;
pub mod notification;
pub mod profile;
pub mod timesheet;
pub mod user;

pub use business::BusinessEntity;
pub use job::{
    AssignedJobEntity, AssignmentStatusDb, JobAssigneeEntity, JobAssignmentEntity, JobEntity,
    JobWithAuthorEntity,
};
pub use message::{ContactEntity, MessageEntity};
pub use notification::NotificationEntity;
pub use profile::{EmployeeEntity, ProfileEntity, RoleDb};
pub use timesheet::{ActiveWorkerEntity, LocationEntity, TimesheetEntity, TimesheetStatusDb};
pub use user::{UserEntity, UserSessionEntity};
