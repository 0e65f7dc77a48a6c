//! Postgres-backed Identity Store.
//!
//! Read-only adapter: account management owns these tables, the
//! authorization engine only queries them. Soft-state filtering
//! (`is_active AND NOT is_deleted`) happens in SQL so callers can never
//! forget it.
//!
//! ## Thread Safety
//!
//! `PostgresIdentityStore` is `Send + Sync`; all operations go through the
//! SQLx connection pool.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use admingate_core::{GroupId, MenuId, UserId};
use admingate_identity::{IdentityError, IdentityStore, RoleLevel, UserRecord};

/// Read-only identity queries against PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresIdentityStore {
    pool: Arc<PgPool>,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    phone: String,
    email_confirmed: bool,
    password_hash: String,
    role_level: String,
    is_active: bool,
    is_deleted: bool,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = IdentityError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role_level = RoleLevel::from_str(&row.role_level).map_err(|e| {
            IdentityError::query(format!("user {} has invalid role level: {e}", row.id))
        })?;

        Ok(UserRecord {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            email_confirmed: row.email_confirmed,
            password_hash: row.password_hash,
            role_level,
            is_active: row.is_active,
            is_deleted: row.is_deleted,
        })
    }
}

fn map_sqlx_error(err: sqlx::Error) -> IdentityError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            IdentityError::unavailable(err.to_string())
        }
        other => IdentityError::query(other.to_string()),
    }
}

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, phone, \
     email_confirmed, password_hash, role_level, is_active, is_deleted";

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserRecord>, IdentityError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(i64::from(user_id))
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        row.map(UserRecord::try_from).transpose()
    }

    #[instrument(skip(self, username))]
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, IdentityError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        row.map(UserRecord::try_from).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn active_group_ids(&self, user_id: UserId) -> Result<Vec<GroupId>, IdentityError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT gu.group_id \
             FROM group_users gu \
             JOIN groups g ON g.id = gu.group_id \
             WHERE gu.user_id = $1 \
               AND gu.is_active AND NOT gu.is_deleted \
               AND g.is_active AND NOT g.is_deleted",
        )
        .bind(i64::from(user_id))
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|(id,)| GroupId::new(id)).collect())
    }

    #[instrument(skip(self), fields(group_id = %group_id))]
    async fn active_menu_ids(&self, group_id: GroupId) -> Result<Vec<MenuId>, IdentityError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT gm.menu_id \
             FROM group_menus gm \
             WHERE gm.group_id = $1 \
               AND gm.is_active AND NOT gm.is_deleted",
        )
        .bind(i64::from(group_id))
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|(id,)| MenuId::new(id)).collect())
    }
}
