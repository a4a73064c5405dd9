//! Request extractors.

pub mod caller;
pub mod json;
pub mod user_auth;

pub use caller::Caller;
pub use json::ApiJson;
pub use user_auth::UserAuth;
