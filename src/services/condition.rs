use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{ResourceLoader, ServiceError, UserService};
use crate::api::order::{Direction, OrderBy};
use crate::database::DatabaseError;

pub const ORDER_BY_CONDITION_ID: &str = "condition_id";
pub const ORDER_BY_USER_ID: &str = "user_id";
pub const ORDER_BY_NAME: &str = "name";

pub fn default_order_by() -> OrderBy {
    OrderBy::new(ORDER_BY_CONDITION_ID, Direction::Asc)
}

/// A named medical condition recorded by a user
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCondition {
    pub user_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCondition {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ConditionFilter {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub start_created_date: Option<DateTime<Utc>>,
    pub end_created_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ConditionStore: Send + Sync {
    async fn create(&self, cnd: &Condition) -> Result<(), DatabaseError>;
    async fn update(&self, cnd: &Condition) -> Result<(), DatabaseError>;
    async fn delete(&self, cnd: &Condition) -> Result<(), DatabaseError>;
    async fn query(
        &self,
        filter: &ConditionFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Condition>, DatabaseError>;
    async fn count(&self, filter: &ConditionFilter) -> Result<i64, DatabaseError>;
    async fn query_by_id(&self, condition_id: Uuid) -> Result<Condition, DatabaseError>;
    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Condition>, DatabaseError>;
}

pub struct ConditionService {
    users: Arc<UserService>,
    store: Arc<dyn ConditionStore>,
}

impl ConditionService {
    pub fn new(users: Arc<UserService>, store: Arc<dyn ConditionStore>) -> Self {
        Self { users, store }
    }

    pub async fn create(&self, nc: NewCondition) -> Result<Condition, ServiceError> {
        let usr = self.users.query_by_id(nc.user_id).await?;
        if !usr.enabled {
            return Err(ServiceError::UserDisabled);
        }

        let now = Utc::now();
        let cnd = Condition {
            id: Uuid::new_v4(),
            user_id: nc.user_id,
            name: nc.name,
            date_created: now,
            date_updated: now,
        };

        self.store
            .create(&cnd)
            .await
            .map_err(ServiceError::store("condition", "create"))?;

        Ok(cnd)
    }

    pub async fn update(&self, mut cnd: Condition, uc: UpdateCondition) -> Result<Condition, ServiceError> {
        if let Some(name) = uc.name {
            cnd.name = name;
        }
        cnd.date_updated = Utc::now();

        self.store
            .update(&cnd)
            .await
            .map_err(ServiceError::store("condition", format!("update: conditionID[{}]", cnd.id)))?;

        Ok(cnd)
    }

    pub async fn delete(&self, cnd: &Condition) -> Result<(), ServiceError> {
        self.store
            .delete(cnd)
            .await
            .map_err(ServiceError::store("condition", format!("delete: conditionID[{}]", cnd.id)))
    }

    pub async fn query(
        &self,
        filter: &ConditionFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Condition>, ServiceError> {
        filter.validate()?;

        self.store
            .query(filter, order_by, page_number, rows_per_page)
            .await
            .map_err(ServiceError::store("condition", "query"))
    }

    pub async fn count(&self, filter: &ConditionFilter) -> Result<i64, ServiceError> {
        filter.validate()?;

        self.store
            .count(filter)
            .await
            .map_err(ServiceError::store("condition", "count"))
    }

    pub async fn query_by_id(&self, condition_id: Uuid) -> Result<Condition, ServiceError> {
        self.store
            .query_by_id(condition_id)
            .await
            .map_err(ServiceError::store("condition", format!("query: conditionID[{}]", condition_id)))
    }

    pub async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Condition>, ServiceError> {
        self.store
            .query_by_user_id(user_id)
            .await
            .map_err(ServiceError::store("condition", format!("query: userID[{}]", user_id)))
    }
}

#[async_trait]
impl ResourceLoader<Condition> for ConditionService {
    async fn load(&self, id: Uuid) -> Result<Condition, ServiceError> {
        self.query_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, MemoryConditionStore};

    #[tokio::test]
    async fn crud_round_trip() {
        let users = testing::user_service();
        let usr = testing::seed_user(&users, "conditions@example.com").await;
        let svc = ConditionService::new(users, Arc::new(MemoryConditionStore::default()));

        let cnd = svc
            .create(NewCondition { user_id: usr.id, name: "Asthma".into() })
            .await
            .unwrap();

        let upd = svc
            .update(cnd.clone(), UpdateCondition { name: Some("Chronic asthma".into()) })
            .await
            .unwrap();
        assert_eq!(upd.name, "Chronic asthma");
        assert_eq!(upd.date_created, cnd.date_created);

        let filter = ConditionFilter { name: Some("Chronic asthma".into()), ..Default::default() };
        assert_eq!(svc.count(&filter).await.unwrap(), 1);

        svc.delete(&upd).await.unwrap();
        assert!(matches!(svc.query_by_id(cnd.id).await, Err(ServiceError::NotFound("condition"))));
    }

    #[tokio::test]
    async fn name_filter_is_exact() {
        let users = testing::user_service();
        let usr = testing::seed_user(&users, "exact@example.com").await;
        let svc = ConditionService::new(users, Arc::new(MemoryConditionStore::default()));
        svc.create(NewCondition { user_id: usr.id, name: "Asthma".into() }).await.unwrap();

        let filter = ConditionFilter { name: Some("Asth".into()), ..Default::default() };
        assert_eq!(svc.count(&filter).await.unwrap(), 0);
    }
}
