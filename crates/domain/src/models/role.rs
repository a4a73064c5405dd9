//! Business roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a profile within its business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    /// Owners and admins run the business dashboard.
    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    /// Returns true if this role may reset the password of, or otherwise
    /// administer, a profile holding `target`.
    ///
    /// Owners manage everyone but other owners; admins manage employees only.
    pub fn can_manage(&self, target: Role) -> bool {
        match self {
            Role::Owner => target != Role::Owner,
            Role::Admin => target == Role::Employee,
            Role::Employee => false,
        }
    }

    /// Where a freshly signed-in user of this role lands.
    pub fn home_path(&self) -> &'static str {
        if self.is_manager() {
            "/dashboard"
        } else {
            "/employee"
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role sets used by the access guard.
pub mod sets {
    use super::Role;

    pub const MANAGERS: &[Role] = &[Role::Owner, Role::Admin];
    pub const OWNER_ONLY: &[Role] = &[Role::Owner];
    pub const ANY_MEMBER: &[Role] = &[Role::Owner, Role::Admin, Role::Employee];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [Role::Owner, Role::Admin, Role::Employee] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Employee).unwrap(), "\"employee\"");
        let role: Role = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(role, Role::Owner);
    }

    #[test]
    fn test_can_manage() {
        assert!(Role::Owner.can_manage(Role::Admin));
        assert!(Role::Owner.can_manage(Role::Employee));
        assert!(!Role::Owner.can_manage(Role::Owner));
        assert!(Role::Admin.can_manage(Role::Employee));
        assert!(!Role::Admin.can_manage(Role::Admin));
        assert!(!Role::Admin.can_manage(Role::Owner));
        assert!(!Role::Employee.can_manage(Role::Employee));
    }

    #[test]
    fn test_home_path() {
        assert_eq!(Role::Owner.home_path(), "/dashboard");
        assert_eq!(Role::Admin.home_path(), "/dashboard");
        assert_eq!(Role::Employee.home_path(), "/employee");
    }

    #[test]
    fn test_role_sets() {
        assert!(sets::MANAGERS.contains(&Role::Admin));
        assert!(!sets::MANAGERS.contains(&Role::Employee));
        assert_eq!(sets::OWNER_ONLY, &[Role::Owner]);
        assert_eq!(sets::ANY_MEMBER.len(), 3);
    }
}
