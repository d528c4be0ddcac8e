use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{ResourceLoader, ServiceError, UserService};
use crate::api::order::{Direction, OrderBy};
use crate::database::DatabaseError;

pub const ORDER_BY_PRODUCT_ID: &str = "product_id";
pub const ORDER_BY_USER_ID: &str = "user_id";
pub const ORDER_BY_NAME: &str = "name";
pub const ORDER_BY_COST: &str = "cost";
pub const ORDER_BY_QUANTITY: &str = "quantity";

pub fn default_order_by() -> OrderBy {
    OrderBy::new(ORDER_BY_PRODUCT_ID, Direction::Asc)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub cost: f64,
    pub quantity: i32,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub user_id: Uuid,
    pub name: String,
    pub cost: f64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ProductFilter {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(range(min = 0.0))]
    pub cost: Option<f64>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, prd: &Product) -> Result<(), DatabaseError>;
    async fn update(&self, prd: &Product) -> Result<(), DatabaseError>;
    async fn delete(&self, prd: &Product) -> Result<(), DatabaseError>;
    async fn query(
        &self,
        filter: &ProductFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Product>, DatabaseError>;
    async fn count(&self, filter: &ProductFilter) -> Result<i64, DatabaseError>;
    async fn query_by_id(&self, product_id: Uuid) -> Result<Product, DatabaseError>;
    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Product>, DatabaseError>;
}

pub struct ProductService {
    users: Arc<UserService>,
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(users: Arc<UserService>, store: Arc<dyn ProductStore>) -> Self {
        Self { users, store }
    }

    pub async fn create(&self, np: NewProduct) -> Result<Product, ServiceError> {
        let usr = self.users.query_by_id(np.user_id).await?;
        if !usr.enabled {
            return Err(ServiceError::UserDisabled);
        }

        let now = Utc::now();
        let prd = Product {
            id: Uuid::new_v4(),
            user_id: np.user_id,
            name: np.name,
            cost: np.cost,
            quantity: np.quantity,
            date_created: now,
            date_updated: now,
        };

        self.store
            .create(&prd)
            .await
            .map_err(ServiceError::store("product", "create"))?;

        Ok(prd)
    }

    pub async fn update(&self, mut prd: Product, up: UpdateProduct) -> Result<Product, ServiceError> {
        if let Some(name) = up.name {
            prd.name = name;
        }
        if let Some(cost) = up.cost {
            prd.cost = cost;
        }
        if let Some(quantity) = up.quantity {
            prd.quantity = quantity;
        }
        prd.date_updated = Utc::now();

        self.store
            .update(&prd)
            .await
            .map_err(ServiceError::store("product", format!("update: productID[{}]", prd.id)))?;

        Ok(prd)
    }

    pub async fn delete(&self, prd: &Product) -> Result<(), ServiceError> {
        self.store
            .delete(prd)
            .await
            .map_err(ServiceError::store("product", format!("delete: productID[{}]", prd.id)))
    }

    pub async fn query(
        &self,
        filter: &ProductFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Product>, ServiceError> {
        filter.validate()?;

        self.store
            .query(filter, order_by, page_number, rows_per_page)
            .await
            .map_err(ServiceError::store("product", "query"))
    }

    pub async fn count(&self, filter: &ProductFilter) -> Result<i64, ServiceError> {
        filter.validate()?;

        self.store
            .count(filter)
            .await
            .map_err(ServiceError::store("product", "count"))
    }

    pub async fn query_by_id(&self, product_id: Uuid) -> Result<Product, ServiceError> {
        self.store
            .query_by_id(product_id)
            .await
            .map_err(ServiceError::store("product", format!("query: productID[{}]", product_id)))
    }

    pub async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Product>, ServiceError> {
        self.store
            .query_by_user_id(user_id)
            .await
            .map_err(ServiceError::store("product", format!("query: userID[{}]", user_id)))
    }
}

#[async_trait]
impl ResourceLoader<Product> for ProductService {
    async fn load(&self, id: Uuid) -> Result<Product, ServiceError> {
        self.query_by_id(id).await
    }
}
