use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::api::order::OrderBy;
use crate::database::clause::{order_by_clause, push_page, WhereClause};
use crate::database::manager::DatabaseError;
use crate::services::user::{self, User, UserFilter, UserRole, UserStore};

const SELECT: &str = "SELECT user_id, name, email, roles, password_hash, department, enabled, date_created, date_updated FROM users";

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    (user::ORDER_BY_USER_ID, "user_id"),
    (user::ORDER_BY_NAME, "name"),
    (user::ORDER_BY_EMAIL, "email"),
    (user::ORDER_BY_ROLES, "roles"),
    (user::ORDER_BY_ENABLED, "enabled"),
];

#[derive(Debug, FromRow)]
struct DbUser {
    user_id: Uuid,
    name: String,
    email: String,
    roles: Vec<String>,
    password_hash: String,
    department: Option<String>,
    enabled: bool,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
}

impl TryFrom<DbUser> for User {
    type Error = DatabaseError;

    fn try_from(row: DbUser) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|r| r.parse::<UserRole>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(DatabaseError::QueryError)?;

        Ok(User {
            id: row.user_id,
            name: row.name,
            email: row.email,
            roles,
            password_hash: row.password_hash,
            department: row.department,
            enabled: row.enabled,
            date_created: row.date_created,
            date_updated: row.date_updated,
        })
    }
}

fn role_names(usr: &User) -> Vec<String> {
    usr.roles.iter().map(|r| r.as_str().to_string()).collect()
}

fn apply_filter(filter: &UserFilter, qb: &mut QueryBuilder<'_, Postgres>) {
    let mut wc = WhereClause::new(qb);

    if let Some(id) = filter.id {
        wc.push("user_id = ", id);
    }
    if let Some(name) = &filter.name {
        wc.push_contains("name", name);
    }
    if let Some(email) = &filter.email {
        wc.push("email = ", email.clone());
    }
    if let Some(start) = filter.start_created_date {
        wc.push("date_created >= ", start);
    }
    if let Some(end) = filter.end_created_date {
        wc.push("date_created <= ", end);
    }
}

/// Postgres-backed user store
pub struct UserDb {
    pool: PgPool,
}

impl UserDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserDb {
    async fn create(&self, usr: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO users (user_id, name, email, roles, password_hash, department, enabled, date_created, date_updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(usr.id)
        .bind(&usr.name)
        .bind(&usr.email)
        .bind(role_names(usr))
        .bind(&usr.password_hash)
        .bind(&usr.department)
        .bind(usr.enabled)
        .bind(usr.date_created)
        .bind(usr.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "email"))?;

        Ok(())
    }

    async fn update(&self, usr: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE users SET name = $2, email = $3, roles = $4, password_hash = $5, department = $6, \
             enabled = $7, date_updated = $8 WHERE user_id = $1",
        )
        .bind(usr.id)
        .bind(&usr.name)
        .bind(&usr.email)
        .bind(role_names(usr))
        .bind(&usr.password_hash)
        .bind(&usr.department)
        .bind(usr.enabled)
        .bind(usr.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "email"))?;

        Ok(())
    }

    async fn delete(&self, usr: &User) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(usr.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn query(
        &self,
        filter: &UserFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<User>, DatabaseError> {
        let mut qb = QueryBuilder::new(SELECT);
        apply_filter(filter, &mut qb);
        qb.push(order_by_clause(order_by, ORDER_BY_FIELDS)?);
        push_page(&mut qb, page_number, rows_per_page);

        debug!(sql = qb.sql(), "users.query");
        let rows: Vec<DbUser> = qb.build_query_as().fetch_all(&self.pool).await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn count(&self, filter: &UserFilter) -> Result<i64, DatabaseError> {
        let mut qb = QueryBuilder::new("SELECT count(1) FROM users");
        apply_filter(filter, &mut qb);

        debug!(sql = qb.sql(), "users.count");
        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;

        Ok(count)
    }

    async fn query_by_id(&self, user_id: Uuid) -> Result<User, DatabaseError> {
        let row: DbUser = sqlx::query_as(&format!("{} WHERE user_id = $1", SELECT))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user_id)))?;

        row.try_into()
    }

    async fn query_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        let row: DbUser = sqlx::query_as(&format!("{} WHERE email = $1", SELECT))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", email)))?;

        row.try_into()
    }
}
