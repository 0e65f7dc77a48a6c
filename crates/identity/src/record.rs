//! Identity records as the store exposes them.
//!
//! These are read models at the engine boundary, not aggregates: account
//! management mutates them elsewhere, the authorization engine only reads.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use admingate_core::{DomainError, GroupId, MenuId, UserId};

/// Coarse role level carried by every user account.
///
/// Ordered by privilege; the zero value is the lowest-privilege level and is
/// the fail-safe default when a user cannot be resolved.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum RoleLevel {
    #[default]
    Guest,
    Member,
    SubAdmin,
    SuperAdmin,
}

impl RoleLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleLevel::Guest => "Guest",
            RoleLevel::Member => "Member",
            RoleLevel::SubAdmin => "SubAdmin",
            RoleLevel::SuperAdmin => "SuperAdmin",
        }
    }
}

impl core::fmt::Display for RoleLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Guest" => Ok(RoleLevel::Guest),
            "Member" => Ok(RoleLevel::Member),
            "SubAdmin" => Ok(RoleLevel::SubAdmin),
            "SuperAdmin" => Ok(RoleLevel::SuperAdmin),
            other => Err(DomainError::validation(format!(
                "unknown role level: {other}"
            ))),
        }
    }
}

/// A user account as the Identity Store exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email_confirmed: bool,
    /// Opaque one-way digest; hashing mechanics live outside this system.
    pub password_hash: String,
    pub role_level: RoleLevel,
    pub is_active: bool,
    pub is_deleted: bool,
}

impl UserRecord {
    /// A user participates in authorization only while active and not
    /// soft-deleted.
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

/// A named bundle aggregating membership and resource grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: GroupId,
    pub name: String,
    pub is_active: bool,
    pub is_deleted: bool,
}

/// Membership row linking a user to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUserRecord {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub is_active: bool,
    pub is_deleted: bool,
}

/// Grant row linking a group to a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMenuRecord {
    pub group_id: GroupId,
    pub menu_id: MenuId,
    pub is_active: bool,
    pub is_deleted: bool,
}
