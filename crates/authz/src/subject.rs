//! Resolved authorization subjects.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use admingate_core::UserId;
use admingate_identity::RoleLevel;

use crate::requirement::{ResourceId, ResourceType};

/// The resolved `{role, grants}` view of a user at a point in time.
///
/// A snapshot does not track live changes; it is recomputed on cache expiry
/// or built fresh by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSnapshot {
    pub role_level: RoleLevel,
    pub resource_grants: HashMap<ResourceType, HashSet<ResourceId>>,
}

impl GrantSnapshot {
    pub fn new(role_level: RoleLevel) -> Self {
        Self {
            role_level,
            resource_grants: HashMap::new(),
        }
    }

    pub fn with_grants(
        mut self,
        resource_type: ResourceType,
        ids: impl IntoIterator<Item = ResourceId>,
    ) -> Self {
        self.resource_grants
            .insert(resource_type, ids.into_iter().collect());
        self
    }

    /// Grants for a resource type; an unresolved type reads as "no access".
    pub fn grants_for(&self, resource_type: ResourceType) -> Option<&HashSet<ResourceId>> {
        self.resource_grants.get(&resource_type)
    }
}

/// Identity recovered from a validated token.
///
/// Role/username/email come from the token claims. The token's embedded menu
/// grants are a stale issuance-time snapshot and are deliberately *not*
/// carried here: resource decisions re-resolve grants through the
/// [`GrantService`](crate::resolver::GrantService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedSubject {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role_level: RoleLevel,
}
