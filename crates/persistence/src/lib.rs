//! Persistence layer for the Crewtrack backend.
//!
//! This crate contains:
//! - Database connection management
//! - SQL migrations (`src/migrations`)
//! - Entity definitions (database row mappings)
//! - Repository implementations, including the storage traits of the
//!   domain services

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
