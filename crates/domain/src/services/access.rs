//! Access guard.
//!
//! Every mutating entry point runs [`authorize`] against the caller's
//! profile before touching storage. The guard fails closed: a missing
//! profile, business or role is a denial, never a pass.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Profile, Role};

/// Why the guard refused a caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("No profile found")]
    NoProfile,

    #[error("No business linked")]
    NoBusiness,

    #[error("Role {0} is not allowed to perform this action")]
    RoleNotAllowed(Role),

    #[error("Resource belongs to another business")]
    BusinessMismatch,
}

/// A caller that passed the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authorized {
    pub user_id: Uuid,
    pub business_id: Uuid,
    pub role: Role,
}

impl Authorized {
    /// Checks that a resource of `business_id` is visible to this caller.
    pub fn ensure_same_business(&self, business_id: Uuid) -> Result<(), AccessDenied> {
        if self.business_id == business_id {
            Ok(())
        } else {
            Err(AccessDenied::BusinessMismatch)
        }
    }
}

/// Decides whether `profile` may act with one of `allowed` roles, optionally
/// on a resource of `target_business`.
pub fn authorize(
    profile: Option<&Profile>,
    allowed: &[Role],
    target_business: Option<Uuid>,
) -> Result<Authorized, AccessDenied> {
    let profile = profile.ok_or(AccessDenied::NoProfile)?;
    let business_id = profile.business_id.ok_or(AccessDenied::NoBusiness)?;
    // A profile without a role is half-provisioned and gets nothing.
    let role = profile.role.ok_or(AccessDenied::NoBusiness)?;

    if !allowed.contains(&role) {
        return Err(AccessDenied::RoleNotAllowed(role));
    }

    let authorized = Authorized {
        user_id: profile.id,
        business_id,
        role,
    };
    if let Some(target) = target_business {
        authorized.ensure_same_business(target)?;
    }
    Ok(authorized)
}
