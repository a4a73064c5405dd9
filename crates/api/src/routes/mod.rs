//! HTTP route handlers.

pub mod assignments;
pub mod auth;
pub mod dashboard;
pub mod employees;
pub mod health;
pub mod jobs;
pub mod messages;
pub mod notifications;
pub mod onboarding;
pub mod timesheets;
pub mod users;
