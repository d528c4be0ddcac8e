use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::api::order::OrderBy;
use crate::database::clause::{order_by_clause, push_page, WhereClause};
use crate::database::manager::DatabaseError;
use crate::services::condition::{self, Condition, ConditionFilter, ConditionStore};

const SELECT: &str = "SELECT condition_id, user_id, name, date_created, date_updated FROM conditions";

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    (condition::ORDER_BY_CONDITION_ID, "condition_id"),
    (condition::ORDER_BY_USER_ID, "user_id"),
    (condition::ORDER_BY_NAME, "name"),
];

#[derive(Debug, FromRow)]
struct DbCondition {
    condition_id: Uuid,
    user_id: Uuid,
    name: String,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
}

impl From<DbCondition> for Condition {
    fn from(row: DbCondition) -> Self {
        Condition {
            id: row.condition_id,
            user_id: row.user_id,
            name: row.name,
            date_created: row.date_created,
            date_updated: row.date_updated,
        }
    }
}

fn apply_filter(filter: &ConditionFilter, qb: &mut QueryBuilder<'_, Postgres>) {
    let mut wc = WhereClause::new(qb);

    if let Some(id) = filter.id {
        wc.push("condition_id = ", id);
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

pub struct ConditionDb {
    pool: PgPool,
}

impl ConditionDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConditionStore for ConditionDb {
    async fn create(&self, cnd: &Condition) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO conditions (condition_id, user_id, name, date_created, date_updated) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(cnd.id)
        .bind(cnd.user_id)
        .bind(&cnd.name)
        .bind(cnd.date_created)
        .bind(cnd.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "condition"))?;

        Ok(())
    }

    async fn update(&self, cnd: &Condition) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE conditions SET name = $2, date_updated = $3 WHERE condition_id = $1")
            .bind(cnd.id)
            .bind(&cnd.name)
            .bind(cnd.date_updated)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, cnd: &Condition) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM conditions WHERE condition_id = $1")
            .bind(cnd.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn query(
        &self,
        filter: &ConditionFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Condition>, DatabaseError> {
        let mut qb = QueryBuilder::new(SELECT);
        apply_filter(filter, &mut qb);
        qb.push(order_by_clause(order_by, ORDER_BY_FIELDS)?);
        push_page(&mut qb, page_number, rows_per_page);

        debug!(sql = qb.sql(), "conditions.query");
        let rows: Vec<DbCondition> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Condition::from).collect())
    }

    async fn count(&self, filter: &ConditionFilter) -> Result<i64, DatabaseError> {
        let mut qb = QueryBuilder::new("SELECT count(1) FROM conditions");
        apply_filter(filter, &mut qb);

        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn query_by_id(&self, condition_id: Uuid) -> Result<Condition, DatabaseError> {
        let row: DbCondition = sqlx::query_as(&format!("{} WHERE condition_id = $1", SELECT))
            .bind(condition_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("condition {}", condition_id)))?;

        Ok(row.into())
    }

    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Condition>, DatabaseError> {
        let rows: Vec<DbCondition> = sqlx::query_as(&format!("{} WHERE user_id = $1", SELECT))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Condition::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_filter_is_exact_match() {
        let filter = ConditionFilter {
            user_id: Some(Uuid::new_v4()),
            name: Some("Asthma".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new(SELECT);
        apply_filter(&filter, &mut qb);

        assert!(qb.sql().ends_with(" WHERE user_id = $1 AND name = $2"));
    }
}
