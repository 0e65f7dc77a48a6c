//! In-memory Identity Store for tests and dev wiring.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use admingate_core::{GroupId, MenuId, UserId};

use crate::record::{GroupMenuRecord, GroupRecord, GroupUserRecord, UserRecord};
use crate::store::{IdentityError, IdentityStore};

/// RwLock-guarded maps standing in for the real identity database.
///
/// Mutation helpers exist so tests can model administrative changes
/// (deactivating a user, flipping a membership) between resolutions.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
    groups: RwLock<HashMap<GroupId, GroupRecord>>,
    group_users: RwLock<Vec<GroupUserRecord>>,
    group_menus: RwLock<Vec<GroupMenuRecord>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_user(&self, user: UserRecord) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id, user);
        }
    }

    pub fn upsert_group(&self, group: GroupRecord) {
        if let Ok(mut groups) = self.groups.write() {
            groups.insert(group.id, group);
        }
    }

    pub fn add_membership(&self, row: GroupUserRecord) {
        if let Ok(mut rows) = self.group_users.write() {
            rows.retain(|r| !(r.user_id == row.user_id && r.group_id == row.group_id));
            rows.push(row);
        }
    }

    pub fn add_menu_grant(&self, row: GroupMenuRecord) {
        if let Ok(mut rows) = self.group_menus.write() {
            rows.retain(|r| !(r.group_id == row.group_id && r.menu_id == row.menu_id));
            rows.push(row);
        }
    }

    /// Flip a user's active flag in place (administrative action).
    pub fn set_user_active(&self, user_id: UserId, is_active: bool) {
        if let Ok(mut users) = self.users.write() {
            if let Some(user) = users.get_mut(&user_id) {
                user.is_active = is_active;
            }
        }
    }

    fn read_poisoned() -> IdentityError {
        IdentityError::unavailable("in-memory store lock poisoned")
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserRecord>, IdentityError> {
        let users = self.users.read().map_err(|_| Self::read_poisoned())?;
        Ok(users.get(&user_id).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, IdentityError> {
        let users = self.users.read().map_err(|_| Self::read_poisoned())?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn active_group_ids(&self, user_id: UserId) -> Result<Vec<GroupId>, IdentityError> {
        let rows = self.group_users.read().map_err(|_| Self::read_poisoned())?;
        let groups = self.groups.read().map_err(|_| Self::read_poisoned())?;

        Ok(rows
            .iter()
            .filter(|r| r.user_id == user_id && r.is_active && !r.is_deleted)
            .filter(|r| {
                groups
                    .get(&r.group_id)
                    .is_some_and(|g| g.is_active && !g.is_deleted)
            })
            .map(|r| r.group_id)
            .collect())
    }

    async fn active_menu_ids(&self, group_id: GroupId) -> Result<Vec<MenuId>, IdentityError> {
        let rows = self.group_menus.read().map_err(|_| Self::read_poisoned())?;

        Ok(rows
            .iter()
            .filter(|r| r.group_id == group_id && r.is_active && !r.is_deleted)
            .map(|r| r.menu_id)
            .collect())
    }
}
