//! Application services shared by several route modules.

pub mod auth;

pub use auth::{AuthError, AuthResult, AuthService, Signup, TokenPair};
