use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::services::condition::{Condition, NewCondition, UpdateCondition};

#[derive(Debug, Serialize)]
pub struct AppCondition {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
    #[serde(rename = "dateUpdated")]
    pub date_updated: String,
}

impl From<Condition> for AppCondition {
    fn from(cnd: Condition) -> Self {
        Self {
            id: cnd.id.to_string(),
            user_id: cnd.user_id.to_string(),
            name: cnd.name,
            date_created: cnd.date_created.to_rfc3339(),
            date_updated: cnd.date_updated.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppNewCondition {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

impl AppNewCondition {
    pub fn into_core(self, user_id: Uuid) -> NewCondition {
        NewCondition { user_id, name: self.name }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppUpdateCondition {
    #[validate(length(min = 1))]
    pub name: Option<String>,
}

impl From<AppUpdateCondition> for UpdateCondition {
    fn from(app: AppUpdateCondition) -> Self {
        Self { name: app.name }
    }
}
