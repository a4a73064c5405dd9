//! Repository implementations for database operations.

pub mod assignment;
pub mod business;
pub mod job;
pub mod message;
pub mod notification;
pub mod profile;
pub mod timesheet;
pub mod user;

pub use assignment::AssignmentRepository;
pub use business::BusinessRepository;
pub use job::JobRepository;
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use profile::ProfileRepository;
pub use timesheet::TimesheetRepository;
pub use user::{NewAccount, UserRepository};
