use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::api::order::OrderBy;
use crate::database::clause::{order_by_clause, push_page, WhereClause};
use crate::database::manager::DatabaseError;
use crate::services::product::{self, Product, ProductFilter, ProductStore};

const SELECT: &str = "SELECT product_id, user_id, name, cost, quantity, date_created, date_updated FROM products";

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    (product::ORDER_BY_PRODUCT_ID, "product_id"),
    (product::ORDER_BY_USER_ID, "user_id"),
    (product::ORDER_BY_NAME, "name"),
    (product::ORDER_BY_COST, "cost"),
    (product::ORDER_BY_QUANTITY, "quantity"),
];

#[derive(Debug, FromRow)]
struct DbProduct {
    product_id: Uuid,
    user_id: Uuid,
    name: String,
    cost: f64,
    quantity: i32,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
}

impl From<DbProduct> for Product {
    fn from(row: DbProduct) -> Self {
        Product {
            id: row.product_id,
            user_id: row.user_id,
            name: row.name,
            cost: row.cost,
            quantity: row.quantity,
            date_created: row.date_created,
            date_updated: row.date_updated,
        }
    }
}

fn apply_filter(filter: &ProductFilter, qb: &mut QueryBuilder<'_, Postgres>) {
    let mut wc = WhereClause::new(qb);

    if let Some(id) = filter.id {
        wc.push("product_id = ", id);
    }
    if let Some(user_id) = filter.user_id {
        wc.push("user_id = ", user_id);
    }
    if let Some(name) = &filter.name {
        wc.push_contains("name", name);
    }
    if let Some(cost) = filter.cost {
        wc.push("cost = ", cost);
    }
    if let Some(quantity) = filter.quantity {
        wc.push("quantity = ", quantity);
    }
}

pub struct ProductDb {
    pool: PgPool,
}

impl ProductDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductDb {
    async fn create(&self, prd: &Product) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO products (product_id, user_id, name, cost, quantity, date_created, date_updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(prd.id)
        .bind(prd.user_id)
        .bind(&prd.name)
        .bind(prd.cost)
        .bind(prd.quantity)
        .bind(prd.date_created)
        .bind(prd.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "product"))?;

        Ok(())
    }

    async fn update(&self, prd: &Product) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE products SET name = $2, cost = $3, quantity = $4, date_updated = $5 WHERE product_id = $1")
            .bind(prd.id)
            .bind(&prd.name)
            .bind(prd.cost)
            .bind(prd.quantity)
            .bind(prd.date_updated)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, prd: &Product) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(prd.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn query(
        &self,
        filter: &ProductFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Product>, DatabaseError> {
        let mut qb = QueryBuilder::new(SELECT);
        apply_filter(filter, &mut qb);
        qb.push(order_by_clause(order_by, ORDER_BY_FIELDS)?);
        push_page(&mut qb, page_number, rows_per_page);

        debug!(sql = qb.sql(), "products.query");
        let rows: Vec<DbProduct> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, DatabaseError> {
        let mut qb = QueryBuilder::new("SELECT count(1) FROM products");
        apply_filter(filter, &mut qb);

        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn query_by_id(&self, product_id: Uuid) -> Result<Product, DatabaseError> {
        let row: DbProduct = sqlx::query_as(&format!("{} WHERE product_id = $1", SELECT))
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("product {}", product_id)))?;

        Ok(row.into())
    }

    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Product>, DatabaseError> {
        let rows: Vec<DbProduct> = sqlx::query_as(&format!("{} WHERE user_id = $1", SELECT))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::order::Direction;

    #[test]
    fn order_by_cost_is_allowed() {
        let by = OrderBy::new(product::ORDER_BY_COST, Direction::Desc);
        assert_eq!(order_by_clause(&by, ORDER_BY_FIELDS).unwrap(), " ORDER BY cost DESC");
    }
}
