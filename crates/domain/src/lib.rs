//! Domain layer for the Crewtrack backend.
//!
//! This crate contains:
//! - Domain models and request/response DTOs
//! - The access guard and role sets
//! - Assignment diffing, reconciliation and notification fan-out
//! - The clock-in/out state machine

pub mod models;
pub mod services;
