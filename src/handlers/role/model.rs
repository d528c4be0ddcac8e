use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::services::role::{Role, NewRole, UpdateRole};

#[derive(Debug, Serialize)]
pub struct AppRole {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
    #[serde(rename = "dateUpdated")]
    pub date_updated: String,
}

impl From<Role> for AppRole {
    fn from(rol: Role) -> Self {
        Self {
            id: rol.id.to_string(),
            user_id: rol.user_id.to_string(),
            name: rol.name,
            date_created: rol.date_created.to_rfc3339(),
            date_updated: rol.date_updated.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppNewRole {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

impl AppNewRole {
    pub fn into_core(self, user_id: Uuid) -> NewRole {
        NewRole { user_id, name: self.name }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppUpdateRole {
    #[validate(length(min = 1))]
    pub name: Option<String>,
}

impl From<AppUpdateRole> for UpdateRole {
    fn from(app: AppUpdateRole) -> Self {
        Self { name: app.name }
    }
}
