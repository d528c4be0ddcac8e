//! In-memory stores and fixtures for unit tests that should not need Postgres.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;

use crate::api::order::{Direction, OrderBy};
use crate::app::{router, AppState, Paging};
use crate::auth::Auth;
use crate::config::AppConfig;
use crate::database::{DatabaseError, HealthCheck};
use crate::services::condition::{Condition, ConditionFilter, ConditionStore};
use crate::services::patient::{Patient, PatientFilter, PatientStore};
use crate::services::product::{Product, ProductFilter, ProductStore};
use crate::services::region::{Region, RegionFilter, RegionStore};
use crate::services::role::{Role, RoleFilter, RoleStore};
use crate::services::user::{NewUser, User, UserFilter, UserRole, UserStore};
use crate::services::{ConditionService, PatientService, ProductService, RegionService, RoleService, UserService};

pub const TEST_PASSWORD: &str = "gophers";

/// Comparable projection of one column, used to emulate ORDER BY.
#[derive(Debug, PartialEq, PartialOrd)]
pub enum SortKey {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Id(Uuid),
}

struct Table<T> {
    rows: RwLock<HashMap<Uuid, T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: RwLock::new(HashMap::new()) }
    }
}

impl<T: Clone + Send + Sync> Table<T> {
    async fn insert(&self, id: Uuid, row: &T) {
        self.rows.write().await.insert(id, row.clone());
    }

    async fn replace(&self, id: Uuid, row: &T, what: &str) -> Result<(), DatabaseError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(existing) => {
                *existing = row.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(what.to_string())),
        }
    }

    async fn remove(&self, id: Uuid) {
        self.rows.write().await.remove(&id);
    }

    async fn get(&self, id: Uuid, what: &str) -> Result<T, DatabaseError> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(what.to_string()))
    }

    async fn select(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.read().await.values().filter(|r| keep(r)).cloned().collect()
    }
}

fn sort_and_page<T>(
    mut rows: Vec<T>,
    order_by: &OrderBy,
    key: impl Fn(&T, &str) -> SortKey,
    page_number: u32,
    rows_per_page: u32,
) -> Vec<T> {
    rows.sort_by(|a, b| {
        let ord = key(a, &order_by.field)
            .partial_cmp(&key(b, &order_by.field))
            .unwrap_or(Ordering::Equal);
        match order_by.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    });

    let skip = page_number.saturating_sub(1) as usize * rows_per_page as usize;
    rows.into_iter().skip(skip).take(rows_per_page as usize).collect()
}

fn created_between(date: DateTime<Utc>, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
    start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
}

#[derive(Default)]
pub struct MemoryUserStore {
    table: Table<User>,
}

impl MemoryUserStore {
    async fn email_taken(&self, usr: &User) -> bool {
        self.table
            .rows
            .read()
            .await
            .values()
            .any(|u| u.email == usr.email && u.id != usr.id)
    }
}

fn user_matches(f: &UserFilter, u: &User) -> bool {
    f.id.map_or(true, |id| u.id == id)
        && f.name.as_ref().map_or(true, |n| u.name.contains(n.as_str()))
        && f.email.as_ref().map_or(true, |e| &u.email == e)
        && created_between(u.date_created, f.start_created_date, f.end_created_date)
}

fn user_key(u: &User, field: &str) -> SortKey {
    match field {
        "name" => SortKey::Text(u.name.clone()),
        "email" => SortKey::Text(u.email.clone()),
        "enabled" => SortKey::Bool(u.enabled),
        _ => SortKey::Id(u.id),
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, usr: &User) -> Result<(), DatabaseError> {
        if self.email_taken(usr).await {
            return Err(DatabaseError::Duplicate("users_email_key".into()));
        }
        self.table.insert(usr.id, usr).await;
        Ok(())
    }

    async fn update(&self, usr: &User) -> Result<(), DatabaseError> {
        if self.email_taken(usr).await {
            return Err(DatabaseError::Duplicate("users_email_key".into()));
        }
        self.table.replace(usr.id, usr, "users").await
    }

    async fn delete(&self, usr: &User) -> Result<(), DatabaseError> {
        self.table.remove(usr.id).await;
        Ok(())
    }

    async fn query(
        &self,
        filter: &UserFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<User>, DatabaseError> {
        let rows = self.table.select(|u| user_matches(filter, u)).await;
        Ok(sort_and_page(rows, order_by, user_key, page_number, rows_per_page))
    }

    async fn count(&self, filter: &UserFilter) -> Result<i64, DatabaseError> {
        Ok(self.table.select(|u| user_matches(filter, u)).await.len() as i64)
    }

    async fn query_by_id(&self, user_id: Uuid) -> Result<User, DatabaseError> {
        self.table.get(user_id, "users").await
    }

    async fn query_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        self.table
            .select(|u| u.email == email)
            .await
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::NotFound("users".into()))
    }
}

#[derive(Default)]
pub struct MemoryPatientStore {
    table: Table<Patient>,
}

fn patient_matches(f: &PatientFilter, p: &Patient) -> bool {
    f.id.map_or(true, |id| p.id == id)
        && f.user_id.map_or(true, |id| p.user_id == id)
        && f.name.as_ref().map_or(true, |n| p.name.contains(n.as_str()))
        && f.age.map_or(true, |a| p.age == a)
        && f.condition.as_ref().map_or(true, |c| &p.condition == c)
        && f.healed.map_or(true, |h| p.healed == h)
        && f.video_link.as_ref().map_or(true, |l| p.video_links.contains(l))
}

fn patient_key(p: &Patient, field: &str) -> SortKey {
    match field {
        "user_id" => SortKey::Id(p.user_id),
        "name" => SortKey::Text(p.name.clone()),
        "age" => SortKey::Int(p.age.into()),
        "condition" => SortKey::Text(p.condition.clone()),
        "healed" => SortKey::Bool(p.healed),
        _ => SortKey::Id(p.id),
    }
}

#[async_trait]
impl PatientStore for MemoryPatientStore {
    async fn create(&self, pn: &Patient) -> Result<(), DatabaseError> {
        self.table.insert(pn.id, pn).await;
        Ok(())
    }

    async fn update(&self, pn: &Patient) -> Result<(), DatabaseError> {
        self.table.replace(pn.id, pn, "patients").await
    }

    async fn delete(&self, pn: &Patient) -> Result<(), DatabaseError> {
        self.table.remove(pn.id).await;
        Ok(())
    }

    async fn query(
        &self,
        filter: &PatientFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Patient>, DatabaseError> {
        let rows = self.table.select(|p| patient_matches(filter, p)).await;
        Ok(sort_and_page(rows, order_by, patient_key, page_number, rows_per_page))
    }

    async fn count(&self, filter: &PatientFilter) -> Result<i64, DatabaseError> {
        Ok(self.table.select(|p| patient_matches(filter, p)).await.len() as i64)
    }

    async fn query_by_id(&self, patient_id: Uuid) -> Result<Patient, DatabaseError> {
        self.table.get(patient_id, "patients").await
    }

    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Patient>, DatabaseError> {
        Ok(self.table.select(|p| p.user_id == user_id).await)
    }
}

#[derive(Default)]
pub struct MemoryProductStore {
    table: Table<Product>,
}

fn product_matches(f: &ProductFilter, p: &Product) -> bool {
    f.id.map_or(true, |id| p.id == id)
        && f.user_id.map_or(true, |id| p.user_id == id)
        && f.name.as_ref().map_or(true, |n| p.name.contains(n.as_str()))
        && f.cost.map_or(true, |c| p.cost == c)
        && f.quantity.map_or(true, |q| p.quantity == q)
}

fn product_key(p: &Product, field: &str) -> SortKey {
    match field {
        "user_id" => SortKey::Id(p.user_id),
        "name" => SortKey::Text(p.name.clone()),
        "cost" => SortKey::Float(p.cost),
        "quantity" => SortKey::Int(p.quantity.into()),
        _ => SortKey::Id(p.id),
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn create(&self, prd: &Product) -> Result<(), DatabaseError> {
        self.table.insert(prd.id, prd).await;
        Ok(())
    }

    async fn update(&self, prd: &Product) -> Result<(), DatabaseError> {
        self.table.replace(prd.id, prd, "products").await
    }

    async fn delete(&self, prd: &Product) -> Result<(), DatabaseError> {
        self.table.remove(prd.id).await;
        Ok(())
    }

    async fn query(
        &self,
        filter: &ProductFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Product>, DatabaseError> {
        let rows = self.table.select(|p| product_matches(filter, p)).await;
        Ok(sort_and_page(rows, order_by, product_key, page_number, rows_per_page))
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, DatabaseError> {
        Ok(self.table.select(|p| product_matches(filter, p)).await.len() as i64)
    }

    async fn query_by_id(&self, product_id: Uuid) -> Result<Product, DatabaseError> {
        self.table.get(product_id, "products").await
    }

    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Product>, DatabaseError> {
        Ok(self.table.select(|p| p.user_id == user_id).await)
    }
}

// Conditions, regions and roles share one row shape, so their doubles do too.
macro_rules! named_store {
    ($store:ident, $trait:ident, $model:ident, $filter:ident, $table:literal) => {
        #[derive(Default)]
        pub struct $store {
            table: Table<$model>,
        }

        impl $store {
            fn matches(f: &$filter, r: &$model) -> bool {
                f.id.map_or(true, |id| r.id == id)
                    && f.user_id.map_or(true, |id| r.user_id == id)
                    && f.name.as_ref().map_or(true, |n| &r.name == n)
                    && created_between(r.date_created, f.start_created_date, f.end_created_date)
            }

            fn key(r: &$model, field: &str) -> SortKey {
                match field {
                    "user_id" => SortKey::Id(r.user_id),
                    "name" => SortKey::Text(r.name.clone()),
                    _ => SortKey::Id(r.id),
                }
            }
        }

        #[async_trait]
        impl $trait for $store {
            async fn create(&self, rec: &$model) -> Result<(), DatabaseError> {
                self.table.insert(rec.id, rec).await;
                Ok(())
            }

            async fn update(&self, rec: &$model) -> Result<(), DatabaseError> {
                self.table.replace(rec.id, rec, $table).await
            }

            async fn delete(&self, rec: &$model) -> Result<(), DatabaseError> {
                self.table.remove(rec.id).await;
                Ok(())
            }

            async fn query(
                &self,
                filter: &$filter,
                order_by: &OrderBy,
                page_number: u32,
                rows_per_page: u32,
            ) -> Result<Vec<$model>, DatabaseError> {
                let rows = self.table.select(|r| Self::matches(filter, r)).await;
                Ok(sort_and_page(rows, order_by, Self::key, page_number, rows_per_page))
            }

            async fn count(&self, filter: &$filter) -> Result<i64, DatabaseError> {
                Ok(self.table.select(|r| Self::matches(filter, r)).await.len() as i64)
            }

            async fn query_by_id(&self, id: Uuid) -> Result<$model, DatabaseError> {
                self.table.get(id, $table).await
            }

            async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<$model>, DatabaseError> {
                Ok(self.table.select(|r| r.user_id == user_id).await)
            }
        }
    };
}

named_store!(MemoryConditionStore, ConditionStore, Condition, ConditionFilter, "conditions");
named_store!(MemoryRegionStore, RegionStore, Region, RegionFilter, "regions");
named_store!(MemoryRoleStore, RoleStore, Role, RoleFilter, "roles");

/// Health check double with a switchable outcome.
pub struct StaticHealth(pub bool);

#[async_trait]
impl HealthCheck for StaticHealth {
    async fn ping(&self) -> Result<(), DatabaseError> {
        if self.0 {
            Ok(())
        } else {
            Err(DatabaseError::QueryError("database down".into()))
        }
    }
}

/// User service over an empty in-memory store, hashing at the minimum cost.
pub fn user_service() -> Arc<UserService> {
    Arc::new(UserService::new(Arc::new(MemoryUserStore::default()), 4))
}

pub async fn seed_user(users: &UserService, email: &str) -> User {
    seed_user_with_roles(users, email, vec![UserRole::User]).await
}

pub async fn seed_user_with_roles(users: &UserService, email: &str, roles: Vec<UserRole>) -> User {
    users
        .create(NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            roles,
            department: None,
            password: TEST_PASSWORD.to_string(),
        })
        .await
        .expect("seed user")
}

/// Application state backed entirely by in-memory stores.
pub fn app_state() -> AppState {
    let cfg = AppConfig::development();
    let users = user_service();

    AppState {
        auth: Arc::new(Auth::new(&cfg.security).expect("development secret")),
        patients: Arc::new(PatientService::new(users.clone(), Arc::new(MemoryPatientStore::default()))),
        conditions: Arc::new(ConditionService::new(users.clone(), Arc::new(MemoryConditionStore::default()))),
        regions: Arc::new(RegionService::new(users.clone(), Arc::new(MemoryRegionStore::default()))),
        roles: Arc::new(RoleService::new(users.clone(), Arc::new(MemoryRoleStore::default()))),
        products: Arc::new(ProductService::new(users.clone(), Arc::new(MemoryProductStore::default()))),
        users,
        health: Arc::new(StaticHealth(true)),
        paging: Paging {
            default_rows: cfg.api.default_rows_per_page,
            max_rows: cfg.api.max_rows_per_page,
        },
    }
}

/// Bearer header value for `usr`.
pub fn bearer(state: &AppState, usr: &User) -> String {
    let claims = state.auth.claims_for(usr.id, usr.roles.clone());
    let token = state.auth.generate_token("test", &claims).expect("sign token");
    format!("Bearer {}", token)
}

/// Run one request through the full router and decode the JSON body, if any.
pub async fn send(
    state: &AppState,
    method: Method,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        req = req.header(header::AUTHORIZATION, value);
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("build request");

    let resp = router(state.clone(), &AppConfig::development())
        .oneshot(req)
        .await
        .expect("router is infallible");

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}
