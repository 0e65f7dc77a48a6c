//! Declarative policy requirements.
//!
//! A [`Requirement`] is attached to an operation at route-registration time
//! and handed to the evaluator as plain data. No reflection, no ambient
//! context.

use serde::{Deserialize, Serialize};

use admingate_core::MenuId;
use admingate_identity::RoleLevel;

/// Raw id of a grantable resource.
///
/// Kept as a plain integer because grants are keyed per [`ResourceType`];
/// the typed wrappers (`MenuId`, ...) apply only once the type is known.
pub type ResourceId = i64;

/// Category of grantable resource.
///
/// Only `Menu` has a join path today; declared non-exhaustive because
/// departments/categories are expected to become grantable later.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ResourceType {
    Menu,
}

impl core::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ResourceType::Menu => f.write_str("Menu"),
        }
    }
}

/// How a set of required resource ids is matched against a subject's grants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Combinator {
    /// Every required id must be granted (AND).
    All,
    /// At least one required id must be granted (OR).
    Any,
}

/// A non-empty set of role levels, satisfied by membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirement {
    pub allowed: Vec<RoleLevel>,
}

impl RoleRequirement {
    pub fn new(allowed: impl Into<Vec<RoleLevel>>) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }

    /// Only the top role level passes (besides the unconditional bypass,
    /// which makes this requirement redundant but harmless).
    pub fn super_admin_only() -> Self {
        Self::new([RoleLevel::SuperAdmin])
    }

    /// SubAdmin or SuperAdmin.
    pub fn admin() -> Self {
        Self::new([RoleLevel::SubAdmin, RoleLevel::SuperAdmin])
    }

    /// SubAdmin or above.
    pub fn sub_admin_or_above() -> Self {
        Self::new([RoleLevel::SubAdmin, RoleLevel::SuperAdmin])
    }

    /// Member or above.
    pub fn member_or_above() -> Self {
        Self::new([RoleLevel::Member, RoleLevel::SubAdmin, RoleLevel::SuperAdmin])
    }
}

/// A `(resource type, ids, combinator)` triple, satisfied against the
/// subject's resolved grant set for that type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub resource_type: ResourceType,
    pub ids: Vec<ResourceId>,
    pub combinator: Combinator,
}

impl ResourceRequirement {
    pub fn new(
        resource_type: ResourceType,
        ids: impl Into<Vec<ResourceId>>,
        combinator: Combinator,
    ) -> Self {
        Self {
            resource_type,
            ids: ids.into(),
            combinator,
        }
    }

    /// Any of the given menu ids suffices (OR).
    pub fn any_of_menus(ids: impl IntoIterator<Item = MenuId>) -> Self {
        Self::new(
            ResourceType::Menu,
            ids.into_iter().map(i64::from).collect::<Vec<_>>(),
            Combinator::Any,
        )
    }

    /// All of the given menu ids are required (AND).
    pub fn all_of_menus(ids: impl IntoIterator<Item = MenuId>) -> Self {
        Self::new(
            ResourceType::Menu,
            ids.into_iter().map(i64::from).collect::<Vec<_>>(),
            Combinator::All,
        )
    }
}

/// A declarative policy unit attached to an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    Role(RoleRequirement),
    Resource(ResourceRequirement),
}

impl From<RoleRequirement> for Requirement {
    fn from(value: RoleRequirement) -> Self {
        Self::Role(value)
    }
}

impl From<ResourceRequirement> for Requirement {
    fn from(value: ResourceRequirement) -> Self {
        Self::Resource(value)
    }
}
