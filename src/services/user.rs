use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{ResourceLoader, ServiceError};
use crate::api::order::{Direction, OrderBy};
use crate::database::DatabaseError;

pub const ORDER_BY_USER_ID: &str = "user_id";
pub const ORDER_BY_NAME: &str = "name";
pub const ORDER_BY_EMAIL: &str = "email";
pub const ORDER_BY_ROLES: &str = "roles";
pub const ORDER_BY_ENABLED: &str = "enabled";

pub fn default_order_by() -> OrderBy {
    OrderBy::new(ORDER_BY_USER_ID, Direction::Asc)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::User => "USER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "USER" => Ok(UserRole::User),
            other => Err(format!("invalid role {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<UserRole>,
    pub password_hash: String,
    pub department: Option<String>,
    pub enabled: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub roles: Vec<UserRole>,
    pub department: Option<String>,
    pub password: String,
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Option<Vec<UserRole>>,
    pub department: Option<String>,
    pub password: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UserFilter {
    pub id: Option<Uuid>,
    #[validate(length(min = 2))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub start_created_date: Option<DateTime<Utc>>,
    pub end_created_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, usr: &User) -> Result<(), DatabaseError>;
    async fn update(&self, usr: &User) -> Result<(), DatabaseError>;
    async fn delete(&self, usr: &User) -> Result<(), DatabaseError>;
    async fn query(
        &self,
        filter: &UserFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<User>, DatabaseError>;
    async fn count(&self, filter: &UserFilter) -> Result<i64, DatabaseError>;
    async fn query_by_id(&self, user_id: Uuid) -> Result<User, DatabaseError>;
    async fn query_by_email(&self, email: &str) -> Result<User, DatabaseError>;
}

/// User management, password hashing and credential checks
pub struct UserService {
    store: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    pub async fn create(&self, nu: NewUser) -> Result<User, ServiceError> {
        let password_hash = self.hash_password(nu.password).await?;
        let now = Utc::now();

        let usr = User {
            id: Uuid::new_v4(),
            name: nu.name,
            email: nu.email,
            roles: nu.roles,
            password_hash,
            department: nu.department,
            enabled: true,
            date_created: now,
            date_updated: now,
        };

        self.store.create(&usr).await.map_err(|e| unique_email(e, "create"))?;

        Ok(usr)
    }

    pub async fn update(&self, mut usr: User, uu: UpdateUser) -> Result<User, ServiceError> {
        if let Some(name) = uu.name {
            usr.name = name;
        }
        if let Some(email) = uu.email {
            usr.email = email;
        }
        if let Some(roles) = uu.roles {
            usr.roles = roles;
        }
        if let Some(department) = uu.department {
            usr.department = Some(department);
        }
        if let Some(password) = uu.password {
            usr.password_hash = self.hash_password(password).await?;
        }
        if let Some(enabled) = uu.enabled {
            usr.enabled = enabled;
        }
        usr.date_updated = Utc::now();

        self.store
            .update(&usr)
            .await
            .map_err(|e| unique_email(e, "update"))?;

        Ok(usr)
    }

    pub async fn delete(&self, usr: &User) -> Result<(), ServiceError> {
        self.store
            .delete(usr)
            .await
            .map_err(ServiceError::store("user", format!("delete: userID[{}]", usr.id)))
    }

    pub async fn query(
        &self,
        filter: &UserFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<User>, ServiceError> {
        filter.validate()?;

        self.store
            .query(filter, order_by, page_number, rows_per_page)
            .await
            .map_err(ServiceError::store("user", "query"))
    }

    pub async fn count(&self, filter: &UserFilter) -> Result<i64, ServiceError> {
        filter.validate()?;

        self.store
            .count(filter)
            .await
            .map_err(ServiceError::store("user", "count"))
    }

    pub async fn query_by_id(&self, user_id: Uuid) -> Result<User, ServiceError> {
        self.store
            .query_by_id(user_id)
            .await
            .map_err(ServiceError::store("user", format!("query: userID[{}]", user_id)))
    }

    pub async fn query_by_email(&self, email: &str) -> Result<User, ServiceError> {
        self.store
            .query_by_email(email)
            .await
            .map_err(ServiceError::store("user", format!("query: email[{}]", email)))
    }

    /// Check an email/password pair. Unknown emails and wrong passwords
    /// both come back as `AuthenticationFailure`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let usr = match self.query_by_email(email).await {
            Ok(usr) => usr,
            Err(ServiceError::NotFound(_)) => return Err(ServiceError::AuthenticationFailure),
            Err(e) => return Err(e),
        };

        let password = password.to_string();
        let hash = usr.password_hash.clone();
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;

        if !matched {
            return Err(ServiceError::AuthenticationFailure);
        }
        if !usr.enabled {
            return Err(ServiceError::UserDisabled);
        }

        Ok(usr)
    }

    async fn hash_password(&self, password: String) -> Result<String, ServiceError> {
        let cost = self.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }
}

fn unique_email(err: DatabaseError, context: &str) -> ServiceError {
    match err {
        DatabaseError::Duplicate(_) => ServiceError::UniqueEmail,
        other => ServiceError::store("user", context)(other),
    }
}

#[async_trait]
impl ResourceLoader<User> for UserService {
    async fn load(&self, id: Uuid) -> Result<User, ServiceError> {
        self.query_by_id(id).await
    }
}
