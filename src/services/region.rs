use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{ResourceLoader, ServiceError, UserService};
use crate::api::order::{Direction, OrderBy};
use crate::database::DatabaseError;

pub const ORDER_BY_REGION_ID: &str = "region_id";
pub const ORDER_BY_USER_ID: &str = "user_id";
pub const ORDER_BY_NAME: &str = "name";

pub fn default_order_by() -> OrderBy {
    OrderBy::new(ORDER_BY_REGION_ID, Direction::Asc)
}

/// Service region a user operates in
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRegion {
    pub user_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRegion {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RegionFilter {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub start_created_date: Option<DateTime<Utc>>,
    pub end_created_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait RegionStore: Send + Sync {
    async fn create(&self, rec: &Region) -> Result<(), DatabaseError>;
    async fn update(&self, rec: &Region) -> Result<(), DatabaseError>;
    async fn delete(&self, rec: &Region) -> Result<(), DatabaseError>;
    async fn query(
        &self,
        filter: &RegionFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Region>, DatabaseError>;
    async fn count(&self, filter: &RegionFilter) -> Result<i64, DatabaseError>;
    async fn query_by_id(&self, region_id: Uuid) -> Result<Region, DatabaseError>;
    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Region>, DatabaseError>;
}

pub struct RegionService {
    users: Arc<UserService>,
    store: Arc<dyn RegionStore>,
}

impl RegionService {
    pub fn new(users: Arc<UserService>, store: Arc<dyn RegionStore>) -> Self {
        Self { users, store }
    }

    pub async fn create(&self, nr: NewRegion) -> Result<Region, ServiceError> {
        let usr = self.users.query_by_id(nr.user_id).await?;
        if !usr.enabled {
            return Err(ServiceError::UserDisabled);
        }

        let now = Utc::now();
        let rec = Region {
            id: Uuid::new_v4(),
            user_id: nr.user_id,
            name: nr.name,
            date_created: now,
            date_updated: now,
        };

        self.store
            .create(&rec)
            .await
            .map_err(ServiceError::store("region", "create"))?;

        Ok(rec)
    }

    pub async fn update(&self, mut rec: Region, ur: UpdateRegion) -> Result<Region, ServiceError> {
        if let Some(name) = ur.name {
            rec.name = name;
        }
        rec.date_updated = Utc::now();

        self.store
            .update(&rec)
            .await
            .map_err(ServiceError::store("region", format!("update: regionID[{}]", rec.id)))?;

        Ok(rec)
    }

    pub async fn delete(&self, rec: &Region) -> Result<(), ServiceError> {
        self.store
            .delete(rec)
            .await
            .map_err(ServiceError::store("region", format!("delete: regionID[{}]", rec.id)))
    }

    pub async fn query(
        &self,
        filter: &RegionFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Region>, ServiceError> {
        filter.validate()?;

        self.store
            .query(filter, order_by, page_number, rows_per_page)
            .await
            .map_err(ServiceError::store("region", "query"))
    }

    pub async fn count(&self, filter: &RegionFilter) -> Result<i64, ServiceError> {
        filter.validate()?;

        self.store
            .count(filter)
            .await
            .map_err(ServiceError::store("region", "count"))
    }

    pub async fn query_by_id(&self, region_id: Uuid) -> Result<Region, ServiceError> {
        self.store
            .query_by_id(region_id)
            .await
            .map_err(ServiceError::store("region", format!("query: regionID[{}]", region_id)))
    }

    pub async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Region>, ServiceError> {
        self.store
            .query_by_user_id(user_id)
            .await
            .map_err(ServiceError::store("region", format!("query: userID[{}]", user_id)))
    }
}

#[async_trait]
impl ResourceLoader<Region> for RegionService {
    async fn load(&self, id: Uuid) -> Result<Region, ServiceError> {
        self.query_by_id(id).await
    }
}
