use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{ResourceLoader, ServiceError, UserService};
use crate::api::order::{Direction, OrderBy};
use crate::database::DatabaseError;

pub const ORDER_BY_ROLE_ID: &str = "role_id";
pub const ORDER_BY_USER_ID: &str = "user_id";
pub const ORDER_BY_NAME: &str = "name";

pub fn default_order_by() -> OrderBy {
    OrderBy::new(ORDER_BY_ROLE_ID, Direction::Asc)
}

/// Job role held within the organisation
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRole {
    pub user_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RoleFilter {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub start_created_date: Option<DateTime<Utc>>,
    pub end_created_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn create(&self, rec: &Role) -> Result<(), DatabaseError>;
    async fn update(&self, rec: &Role) -> Result<(), DatabaseError>;
    async fn delete(&self, rec: &Role) -> Result<(), DatabaseError>;
    async fn query(
        &self,
        filter: &RoleFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Role>, DatabaseError>;
    async fn count(&self, filter: &RoleFilter) -> Result<i64, DatabaseError>;
    async fn query_by_id(&self, role_id: Uuid) -> Result<Role, DatabaseError>;
    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Role>, DatabaseError>;
}

pub struct RoleService {
    users: Arc<UserService>,
    store: Arc<dyn RoleStore>,
}

impl RoleService {
    pub fn new(users: Arc<UserService>, store: Arc<dyn RoleStore>) -> Self {
        Self { users, store }
    }

    pub async fn create(&self, nr: NewRole) -> Result<Role, ServiceError> {
        let usr = self.users.query_by_id(nr.user_id).await?;
        if !usr.enabled {
            return Err(ServiceError::UserDisabled);
        }

        let now = Utc::now();
        let rec = Role {
            id: Uuid::new_v4(),
            user_id: nr.user_id,
            name: nr.name,
            date_created: now,
            date_updated: now,
        };

        self.store
            .create(&rec)
            .await
            .map_err(ServiceError::store("role", "create"))?;

        Ok(rec)
    }

    pub async fn update(&self, mut rec: Role, ur: UpdateRole) -> Result<Role, ServiceError> {
        if let Some(name) = ur.name {
            rec.name = name;
        }
        rec.date_updated = Utc::now();

        self.store
            .update(&rec)
            .await
            .map_err(ServiceError::store("role", format!("update: roleID[{}]", rec.id)))?;

        Ok(rec)
    }

    pub async fn delete(&self, rec: &Role) -> Result<(), ServiceError> {
        self.store
            .delete(rec)
            .await
            .map_err(ServiceError::store("role", format!("delete: roleID[{}]", rec.id)))
    }

    pub async fn query(
        &self,
        filter: &RoleFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Role>, ServiceError> {
        filter.validate()?;

        self.store
            .query(filter, order_by, page_number, rows_per_page)
            .await
            .map_err(ServiceError::store("role", "query"))
    }

    pub async fn count(&self, filter: &RoleFilter) -> Result<i64, ServiceError> {
        filter.validate()?;

        self.store
            .count(filter)
            .await
            .map_err(ServiceError::store("role", "count"))
    }

    pub async fn query_by_id(&self, role_id: Uuid) -> Result<Role, ServiceError> {
        self.store
            .query_by_id(role_id)
            .await
            .map_err(ServiceError::store("role", format!("query: roleID[{}]", role_id)))
    }

    pub async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Role>, ServiceError> {
        self.store
            .query_by_user_id(user_id)
            .await
            .map_err(ServiceError::store("role", format!("query: userID[{}]", user_id)))
    }
}

#[async_trait]
impl ResourceLoader<Role> for RoleService {
    async fn load(&self, id: Uuid) -> Result<Role, ServiceError> {
        self.query_by_id(id).await
    }
}
