use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{ResourceLoader, ServiceError, UserService};
use crate::api::order::{Direction, OrderBy};
use crate::database::DatabaseError;

pub const ORDER_BY_PATIENT_ID: &str = "patient_id";
pub const ORDER_BY_USER_ID: &str = "user_id";
pub const ORDER_BY_NAME: &str = "name";
pub const ORDER_BY_AGE: &str = "age";
pub const ORDER_BY_CONDITION: &str = "condition";
pub const ORDER_BY_HEALED: &str = "healed";

pub fn default_order_by() -> OrderBy {
    OrderBy::new(ORDER_BY_PATIENT_ID, Direction::Asc)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub video_links: Vec<String>,
    pub condition: String,
    pub healed: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub video_links: Vec<String>,
    pub condition: String,
    pub healed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePatient {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub video_links: Option<Vec<String>>,
    pub condition: Option<String>,
    pub healed: Option<bool>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct PatientFilter {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[validate(length(min = 3))]
    pub name: Option<String>,
    pub age: Option<i32>,
    pub condition: Option<String>,
    pub healed: Option<bool>,
    /// Matches rows whose link list contains this link.
    pub video_link: Option<String>,
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn create(&self, pn: &Patient) -> Result<(), DatabaseError>;
    async fn update(&self, pn: &Patient) -> Result<(), DatabaseError>;
    async fn delete(&self, pn: &Patient) -> Result<(), DatabaseError>;
    async fn query(
        &self,
        filter: &PatientFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Patient>, DatabaseError>;
    async fn count(&self, filter: &PatientFilter) -> Result<i64, DatabaseError>;
    async fn query_by_id(&self, patient_id: Uuid) -> Result<Patient, DatabaseError>;
    async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Patient>, DatabaseError>;
}

pub struct PatientService {
    users: Arc<UserService>,
    store: Arc<dyn PatientStore>,
}

impl PatientService {
    pub fn new(users: Arc<UserService>, store: Arc<dyn PatientStore>) -> Self {
        Self { users, store }
    }

    pub async fn create(&self, np: NewPatient) -> Result<Patient, ServiceError> {
        let usr = self.users.query_by_id(np.user_id).await?;
        if !usr.enabled {
            return Err(ServiceError::UserDisabled);
        }

        let now = Utc::now();
        let pn = Patient {
            id: Uuid::new_v4(),
            user_id: np.user_id,
            name: np.name,
            age: np.age,
            video_links: np.video_links,
            condition: np.condition,
            healed: np.healed,
            date_created: now,
            date_updated: now,
        };

        self.store
            .create(&pn)
            .await
            .map_err(ServiceError::store("patient", "create"))?;

        Ok(pn)
    }

    pub async fn update(&self, mut pn: Patient, up: UpdatePatient) -> Result<Patient, ServiceError> {
        if let Some(name) = up.name {
            pn.name = name;
        }
        if let Some(age) = up.age {
            pn.age = age;
        }
        if let Some(video_links) = up.video_links {
            pn.video_links = video_links;
        }
        if let Some(condition) = up.condition {
            pn.condition = condition;
        }
        if let Some(healed) = up.healed {
            pn.healed = healed;
        }
        pn.date_updated = Utc::now();

        self.store
            .update(&pn)
            .await
            .map_err(ServiceError::store("patient", format!("update: patientID[{}]", pn.id)))?;

        Ok(pn)
    }

    pub async fn delete(&self, pn: &Patient) -> Result<(), ServiceError> {
        self.store
            .delete(pn)
            .await
            .map_err(ServiceError::store("patient", format!("delete: patientID[{}]", pn.id)))
    }

    pub async fn query(
        &self,
        filter: &PatientFilter,
        order_by: &OrderBy,
        page_number: u32,
        rows_per_page: u32,
    ) -> Result<Vec<Patient>, ServiceError> {
        filter.validate()?;

        self.store
            .query(filter, order_by, page_number, rows_per_page)
            .await
            .map_err(ServiceError::store("patient", "query"))
    }

    pub async fn count(&self, filter: &PatientFilter) -> Result<i64, ServiceError> {
        filter.validate()?;

        self.store
            .count(filter)
            .await
            .map_err(ServiceError::store("patient", "count"))
    }

    pub async fn query_by_id(&self, patient_id: Uuid) -> Result<Patient, ServiceError> {
        self.store
            .query_by_id(patient_id)
            .await
            .map_err(ServiceError::store("patient", format!("query: patientID[{}]", patient_id)))
    }

    pub async fn query_by_user_id(&self, user_id: Uuid) -> Result<Vec<Patient>, ServiceError> {
        self.store
            .query_by_user_id(user_id)
            .await
            .map_err(ServiceError::store("patient", format!("query: userID[{}]", user_id)))
    }
}

#[async_trait]
impl ResourceLoader<Patient> for PatientService {
    async fn load(&self, id: Uuid) -> Result<Patient, ServiceError> {
        self.query_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::user::UpdateUser;
    use crate::testing::{self, MemoryPatientStore};

    async fn setup() -> (Arc<UserService>, PatientService, Uuid) {
        let users = testing::user_service();
        let usr = testing::seed_user(&users, "patients@example.com").await;
        let svc = PatientService::new(users.clone(), Arc::new(MemoryPatientStore::default()));
        (users, svc, usr.id)
    }

    fn new_patient(user_id: Uuid, name: &str) -> NewPatient {
        NewPatient {
            user_id,
            name: name.to_string(),
            age: 42,
            video_links: vec!["https://videos.example.com/a".to_string()],
            condition: "fracture".to_string(),
            healed: false,
        }
    }

    #[tokio::test]
    async fn create_stamps_id_and_dates() {
        let (_, svc, user_id) = setup().await;
        let pn = svc.create(new_patient(user_id, "Jane Doe")).await.unwrap();

        assert_eq!(pn.user_id, user_id);
        assert_eq!(pn.date_created, pn.date_updated);
        assert_eq!(svc.query_by_id(pn.id).await.unwrap(), pn);
    }

    #[tokio::test]
    async fn create_requires_enabled_owner() {
        let (users, svc, user_id) = setup().await;

        let missing = svc.create(new_patient(Uuid::new_v4(), "Nobody")).await.unwrap_err();
        assert!(matches!(missing, ServiceError::NotFound("user")));

        let usr = users.query_by_id(user_id).await.unwrap();
        users
            .update(usr, UpdateUser { enabled: Some(false), ..Default::default() })
            .await
            .unwrap();
        let disabled = svc.create(new_patient(user_id, "Jane Doe")).await.unwrap_err();
        assert!(matches!(disabled, ServiceError::UserDisabled));
    }

    #[tokio::test]
    async fn update_only_touches_provided_fields() {
        let (_, svc, user_id) = setup().await;
        let pn = svc.create(new_patient(user_id, "Jane Doe")).await.unwrap();

        let upd = svc
            .update(pn.clone(), UpdatePatient { healed: Some(true), ..Default::default() })
            .await
            .unwrap();

        assert!(upd.healed);
        assert_eq!(upd.name, pn.name);
        assert_eq!(upd.video_links, pn.video_links);
        assert!(upd.date_updated >= pn.date_updated);
    }

    #[tokio::test]
    async fn delete_then_lookup_is_not_found() {
        let (_, svc, user_id) = setup().await;
        let pn = svc.create(new_patient(user_id, "Jane Doe")).await.unwrap();

        svc.delete(&pn).await.unwrap();
        assert!(svc.query_by_id(pn.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn query_filters_and_counts() {
        let (_, svc, user_id) = setup().await;
        svc.create(new_patient(user_id, "Jane Doe")).await.unwrap();
        svc.create(new_patient(user_id, "John Smith")).await.unwrap();

        let filter = PatientFilter { name: Some("Doe".into()), ..Default::default() };
        let found = svc.query(&filter, &default_order_by(), 1, 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(svc.count(&filter).await.unwrap(), 1);

        assert_eq!(svc.query_by_user_id(user_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn short_name_filter_is_invalid() {
        let (_, svc, _) = setup().await;
        let filter = PatientFilter { name: Some("Jo".into()), ..Default::default() };
        assert!(matches!(svc.count(&filter).await, Err(ServiceError::Validation(_))));
    }
}
