//! Role and grant resolution.
//!
//! Computes a user's coarse role level and the set of resource ids reachable
//! through their active group memberships, caching both for
//! [`GRANT_TTL_MINUTES`] so the per-request cost is one map lookup.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use tracing::instrument;

use admingate_core::{Clock, UserId};
use admingate_identity::{IdentityError, IdentityStore, RoleLevel};

use crate::cache::TtlCache;
use crate::requirement::{ResourceId, ResourceType};
use crate::subject::GrantSnapshot;

/// How long a resolved role or grant set is served without re-reading the
/// Identity Store, in minutes. Administrative changes become visible only
/// after this window; there is no push-based invalidation.
pub const GRANT_TTL_MINUTES: i64 = 15;

/// Resolves roles and grants through the TTL cache.
///
/// Cheap to clone; clones share the same cache.
pub struct GrantService<S> {
    store: S,
    roles: Arc<TtlCache<UserId, RoleLevel>>,
    grants: Arc<TtlCache<(ResourceType, UserId), HashSet<ResourceId>>>,
    ttl: Duration,
}

impl<S> Clone for GrantService<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            roles: self.roles.clone(),
            grants: self.grants.clone(),
            ttl: self.ttl,
        }
    }
}

impl<S> GrantService<S>
where
    S: IdentityStore,
{
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(store, clock, Duration::minutes(GRANT_TTL_MINUTES))
    }

    /// Override the TTL (tests mostly; production wiring uses
    /// [`GRANT_TTL_MINUTES`]).
    pub fn with_ttl(store: S, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            roles: Arc::new(TtlCache::new(clock.clone())),
            grants: Arc::new(TtlCache::new(clock)),
            ttl,
        }
    }

    /// Resolve the user's role level, populating the cache.
    ///
    /// A missing user resolves to the lowest-privilege level rather than an
    /// error; callers relying on "user exists" check that through the
    /// Identity Store independently.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn resolve_role(&self, user_id: UserId) -> Result<RoleLevel, IdentityError> {
        self.roles
            .get_or_compute(user_id, self.ttl, || async {
                let role = self
                    .store
                    .find_user(user_id)
                    .await?
                    .filter(|u| u.is_usable())
                    .map(|u| u.role_level)
                    .unwrap_or_default();
                Ok(role)
            })
            .await
    }

    /// Resolve the set of resource ids the user may touch, populating the
    /// cache under `(resource_type, user_id)`.
    ///
    /// Resource types without a join path resolve to the empty set: a
    /// correct "no access" result, not an error.
    #[instrument(skip(self), fields(user_id = %user_id, resource_type = %resource_type))]
    pub async fn resolve_grants(
        &self,
        user_id: UserId,
        resource_type: ResourceType,
    ) -> Result<HashSet<ResourceId>, IdentityError> {
        self.grants
            .get_or_compute((resource_type, user_id), self.ttl, || async {
                match resource_type {
                    ResourceType::Menu => self.load_menu_grants(user_id).await,
                    #[allow(unreachable_patterns)]
                    _ => Ok(HashSet::new()),
                }
            })
            .await
    }

    /// Resolve role + menu grants into one subject snapshot.
    pub async fn snapshot(&self, user_id: UserId) -> Result<GrantSnapshot, IdentityError> {
        let role_level = self.resolve_role(user_id).await?;
        let menu_grants = self.resolve_grants(user_id, ResourceType::Menu).await?;

        Ok(GrantSnapshot::new(role_level).with_grants(ResourceType::Menu, menu_grants))
    }

    /// Active membership rows → active groups → active menu links, unioned
    /// across all groups the user belongs to.
    async fn load_menu_grants(
        &self,
        user_id: UserId,
    ) -> Result<HashSet<ResourceId>, IdentityError> {
        let mut menu_ids = HashSet::new();

        for group_id in self.store.active_group_ids(user_id).await? {
            for menu_id in self.store.active_menu_ids(group_id).await? {
                menu_ids.insert(i64::from(menu_id));
            }
        }

        tracing::debug!(
            user_id = %user_id,
            grant_count = menu_ids.len(),
            "resolved menu grants"
        );

        Ok(menu_ids)
    }
}
