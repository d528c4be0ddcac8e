use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::api::order::OrderBy;
use crate::database::clause::{order_by_clause, push_page, WhereClause};
use crate::database::manager::DatabaseError;
use crate::services::role::{self, Role, RoleFilter, RoleStore};

const SELECT: &str = "SELECT role_id, user_id, name, date_created, date_updated FROM roles";

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    (role::ORDER_BY_ROLE_ID, "role_id"),
    (role::ORDER_BY_USER_ID, "user_id"),
    (role::ORDER_BY_NAME, "name"),
];

#[derive(Debug, FromRow)]
struct DbRole {
    role_id: Uuid,
    user_id: Uuid,
    name: String,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
}

impl From<DbRole> for Role {
    fn from(row: DbRole) -> Self {
        Role {
            id: row.role_id,
            user_id: row.user_id,
            name: row.name,
            date_created: row.date_created,
            date_updated: row.date_updated,
        }
    }
}

fn apply_filter(filter: &RoleFilter, qb: &mut QueryBuilder<'_, Postgres>) {
    let mut wc = WhereClause::new(qb);

    if let Some(id) = filter.id {
        wc.push("role_id = ", id);
    }
    if let Some(user_id) = filter.user_id {
        wc.push("user_id = ", user_id);
    }
    if let Some(name) = &filter.name {
        wc.push("name = ", name.clone());
    }
    if let Some(start) = filter.start_created_date {
        wc.push("date_created >= ", start);
    }
    if let Some(end) = filter.end_created_date {
        wc.push("date_created <= ", end);
    }
}

pub struct RoleDb {
    pool: PgPool,
}

impl RoleDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for RoleDb {
    async fn create(&self, rec: &Role) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO roles (role_id, user_id, name, date_created, date_updated) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(rec.id)
        .bind(rec.user_id)
        .bind(&rec.name)
        .bind(rec.date_created)
        .bind(rec.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "role"))?;

        Ok(())
    }

    async fn update(&self, rec: &Role) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE roles SET name = $2, date_updated = $3 WHERE role_id = $1")
            .bind(rec.id)
            .bind(&rec.name)
            .bind(rec.date_updated)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, rec: &Role) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM roles WHERE role_id = $1")
            .bind(rec.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn query(
        &self,
        filter: &RoleFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Role>, DatabaseError> {
        let mut qb = QueryBuilder::new(SELECT);
        apply_filter(filter, &mut qb);
        qb.push(order_by_clause(order_by, ORDER_BY_FIELDS)?);
        push_page(&mut qb, page_number, rows_per_page);

        debug!(sql = qb.sql(), "roles.query");
        let rows: Vec<DbRole> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn count(&self, filter: &RoleFilter) -> Result<i64, DatabaseError> {
        let mut qb = QueryBuilder::new("SELECT count(1) FROM roles");
        apply_filter(filter, &mut qb);

        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn query_by_id(&self, role_id: Uuid) -> Result<Role, DatabaseError> {
        let row: DbRole = sqlx::query_as(&format!("{} WHERE role_id = $1", SELECT))
            .bind(role_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("role {}", role_id)))?;

        Ok(row.into())
    }

    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Role>, DatabaseError> {
        let rows: Vec<DbRole> = sqlx::query_as(&format!("{} WHERE user_id = $1", SELECT))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Role::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::order::Direction;

    #[test]
    fn query_sql_orders_then_pages() {
        let mut qb = QueryBuilder::new(SELECT);
        apply_filter(&RoleFilter { name: Some("Nurse".into()), ..Default::default() }, &mut qb);
        qb.push(order_by_clause(&OrderBy::new(role::ORDER_BY_NAME, Direction::Desc), ORDER_BY_FIELDS).unwrap());
        push_page(&mut qb, 2, 20);

        assert!(qb
            .sql()
            .ends_with("FROM roles WHERE name = $1 ORDER BY name DESC OFFSET $2 ROWS FETCH NEXT $3 ROWS ONLY"));
    }
}
