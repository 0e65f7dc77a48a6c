//! Read-only Identity Store contract.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use admingate_core::{GroupId, MenuId, UserId};

use crate::record::UserRecord;

/// Failure talking to the backing identity storage.
///
/// These are infrastructure faults (pool closed, network down), not
/// authorization outcomes. Callers treat them fail-closed.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity store query failed: {0}")]
    Query(String),

    #[error("identity store unavailable: {0}")]
    Unavailable(String),
}

impl IdentityError {
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Read queries the authorization engine needs, pre-filtered on soft state.
///
/// Every method only ever returns rows where `is_active && !is_deleted`
/// holds for the row itself *and* for the entities it references (a
/// membership in a deactivated group is not an active membership).
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fetch a user by id, regardless of soft state (callers check
    /// [`UserRecord::is_usable`] themselves; the validator needs to
    /// distinguish "missing" from "present but deactivated" in its logs).
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserRecord>, IdentityError>;

    /// Fetch a user by username (login path). Same soft-state note as
    /// [`find_user`](IdentityStore::find_user).
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, IdentityError>;

    /// Ids of groups the user is an active member of. Filters the membership
    /// row and the group itself.
    async fn active_group_ids(&self, user_id: UserId) -> Result<Vec<GroupId>, IdentityError>;

    /// Ids of menus granted to a group through active link rows.
    async fn active_menu_ids(&self, group_id: GroupId) -> Result<Vec<MenuId>, IdentityError>;
}

#[async_trait]
impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserRecord>, IdentityError> {
        (**self).find_user(user_id).await
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, IdentityError> {
        (**self).find_user_by_username(username).await
    }

    async fn active_group_ids(&self, user_id: UserId) -> Result<Vec<GroupId>, IdentityError> {
        (**self).active_group_ids(user_id).await
    }

    async fn active_menu_ids(&self, group_id: GroupId) -> Result<Vec<MenuId>, IdentityError> {
        (**self).active_menu_ids(group_id).await
    }
}
