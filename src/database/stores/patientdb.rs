use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::api::order::OrderBy;
use crate::database::clause::{order_by_clause, push_page, WhereClause};
use crate::database::manager::DatabaseError;
use crate::services::patient::{self, Patient, PatientFilter, PatientStore};

const SELECT: &str =
    "SELECT patient_id, user_id, name, age, condition, healed, video_links, date_created, date_updated FROM patients";

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    (patient::ORDER_BY_PATIENT_ID, "patient_id"),
    (patient::ORDER_BY_USER_ID, "user_id"),
    (patient::ORDER_BY_NAME, "name"),
    (patient::ORDER_BY_AGE, "age"),
    (patient::ORDER_BY_CONDITION, "condition"),
    (patient::ORDER_BY_HEALED, "healed"),
];

#[derive(Debug, FromRow)]
struct DbPatient {
    patient_id: Uuid,
    user_id: Uuid,
    name: String,
    age: i32,
    condition: String,
    healed: bool,
    video_links: Vec<String>,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
}

impl From<DbPatient> for Patient {
    fn from(row: DbPatient) -> Self {
        Patient {
            id: row.patient_id,
            user_id: row.user_id,
            name: row.name,
            age: row.age,
            video_links: row.video_links,
            condition: row.condition,
            healed: row.healed,
            date_created: row.date_created,
            date_updated: row.date_updated,
        }
    }
}

fn apply_filter(filter: &PatientFilter, qb: &mut QueryBuilder<'_, Postgres>) {
    let mut wc = WhereClause::new(qb);

    if let Some(id) = filter.id {
        wc.push("patient_id = ", id);
    }
    if let Some(user_id) = filter.user_id {
        wc.push("user_id = ", user_id);
    }
    if let Some(name) = &filter.name {
        wc.push_contains("name", name);
    }
    if let Some(age) = filter.age {
        wc.push("age = ", age);
    }
    if let Some(condition) = &filter.condition {
        wc.push("condition = ", condition.clone());
    }
    if let Some(healed) = filter.healed {
        wc.push("healed = ", healed);
    }
    if let Some(link) = &filter.video_link {
        wc.push_wrapped("video_links @> ARRAY[", link.clone(), "]");
    }
}

pub struct PatientDb {
    pool: PgPool,
}

impl PatientDb {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientStore for PatientDb {
    async fn create(&self, pn: &Patient) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO patients (patient_id, user_id, name, age, condition, healed, video_links, date_created, date_updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(pn.id)
        .bind(pn.user_id)
        .bind(&pn.name)
        .bind(pn.age)
        .bind(&pn.condition)
        .bind(pn.healed)
        .bind(&pn.video_links)
        .bind(pn.date_created)
        .bind(pn.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "patient"))?;

        Ok(())
    }

    async fn update(&self, pn: &Patient) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE patients SET name = $2, age = $3, condition = $4, healed = $5, video_links = $6, \
             date_updated = $7 WHERE patient_id = $1",
        )
        .bind(pn.id)
        .bind(&pn.name)
        .bind(pn.age)
        .bind(&pn.condition)
        .bind(pn.healed)
        .bind(&pn.video_links)
        .bind(pn.date_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, pn: &Patient) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM patients WHERE patient_id = $1")
            .bind(pn.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn query(
        &self,
        filter: &PatientFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Patient>, DatabaseError> {
        let mut qb = QueryBuilder::new(SELECT);
        apply_filter(filter, &mut qb);
        qb.push(order_by_clause(order_by, ORDER_BY_FIELDS)?);
        push_page(&mut qb, page_number, rows_per_page);

        debug!(sql = qb.sql(), "patients.query");
        let rows: Vec<DbPatient> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Patient::from).collect())
    }

    async fn count(&self, filter: &PatientFilter) -> Result<i64, DatabaseError> {
        let mut qb = QueryBuilder::new("SELECT count(1) FROM patients");
        apply_filter(filter, &mut qb);

        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn query_by_id(&self, patient_id: Uuid) -> Result<Patient, DatabaseError> {
        let row: DbPatient = sqlx::query_as(&format!("{} WHERE patient_id = $1", SELECT))
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("patient {}", patient_id)))?;

        Ok(row.into())
    }

    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Patient>, DatabaseError> {
        let rows: Vec<DbPatient> = sqlx::query_as(&format!("{} WHERE user_id = $1", SELECT))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Patient::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_uses_like_for_name_and_containment_for_links() {
        let filter = PatientFilter {
            name: Some("Doe".into()),
            condition: Some("fracture".into()),
            video_link: Some("https://videos.example.com/a".into()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("SELECT count(1) FROM patients");
        apply_filter(&filter, &mut qb);

        assert_eq!(
            qb.sql(),
            "SELECT count(1) FROM patients WHERE name LIKE $1 ESCAPE '\\' AND condition = $2 AND video_links @> ARRAY[$3]"
        );
    }

    #[test]
    fn empty_filter_adds_no_where() {
        let mut qb = QueryBuilder::new(SELECT);
        apply_filter(&PatientFilter::default(), &mut qb);
        assert_eq!(qb.sql(), SELECT);
    }
}
