use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::api::order::OrderBy;
use crate::database::clause::{order_by_clause, push_page, WhereClause};
use crate::database::manager::DatabaseError;
use crate::services::region::{self, Region, RegionFilter, RegionStore};

const SELECT: &str = "SELECT region_id, user_id, name, date_created, date_updated FROM regions";

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    (region::ORDER_BY_REGION_ID, "region_id"),
    (region::ORDER_BY_USER_ID, "user_id"),
    (region::ORDER_BY_NAME, "name"),
];

#[derive(Debug, FromRow)]
struct DbRegion {
    region_id: Uuid,
    user_id: Uuid,
    name: String,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
}

impl From<DbRegion> for Region {
    fn from(row: DbRegion) -> Self {
        Region {
            id: row.region_id,
            user_id: row.user_id,
            name: row.name,
            date_created: row.date_created,
            date_updated: row.date_updated,
        }
    }
}

fn apply_filter(filter: &RegionFilter, qb: &mut QueryBuilder<'_, Postgres>) {
    let mut wc = WhereClause::new(qb);

    if let Some(id) = filter.id {
        wc.push("region_id = ", id);
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

pub struct RegionDb {
    pool: PgPool,
}

impl RegionDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegionStore for RegionDb {
    async fn create(&self, rec: &Region) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO regions (region_id, user_id, name, date_created, date_updated) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(rec.id)
        .bind(rec.user_id)
        .bind(&rec.name)
        .bind(rec.date_created)
        .bind(rec.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "region"))?;

        Ok(())
    }

    async fn update(&self, rec: &Region) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE regions SET name = $2, date_updated = $3 WHERE region_id = $1")
            .bind(rec.id)
            .bind(&rec.name)
            .bind(rec.date_updated)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, rec: &Region) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM regions WHERE region_id = $1")
            .bind(rec.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn query(
        &self,
        filter: &RegionFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Region>, DatabaseError> {
        let mut qb = QueryBuilder::new(SELECT);
        apply_filter(filter, &mut qb);
        qb.push(order_by_clause(order_by, ORDER_BY_FIELDS)?);
        push_page(&mut qb, page_number, rows_per_page);

        debug!(sql = qb.sql(), "regions.query");
        let rows: Vec<DbRegion> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Region::from).collect())
    }

    async fn count(&self, filter: &RegionFilter) -> Result<i64, DatabaseError> {
        let mut qb = QueryBuilder::new("SELECT count(1) FROM regions");
        apply_filter(filter, &mut qb);

        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn query_by_id(&self, region_id: Uuid) -> Result<Region, DatabaseError> {
        let row: DbRegion = sqlx::query_as(&format!("{} WHERE region_id = $1", SELECT))
            .bind(region_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("region {}", region_id)))?;

        Ok(row.into())
    }

    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Region>, DatabaseError> {
        let rows: Vec<DbRegion> = sqlx::query_as(&format!("{} WHERE user_id = $1", SELECT))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Region::from).collect())
    }
}
