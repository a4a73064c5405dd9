//! Shared utilities for the Crewtrack backend.
//!
//! This crate provides functionality used across all other crates:
//! - Token hashing and random token generation
//! - Password hashing with Argon2id and the password length policy
//! - Session token (JWT) issuing and validation
//! - Coordinate and text validation helpers

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
