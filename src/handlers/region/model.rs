use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::services::region::{Region, NewRegion, UpdateRegion};

#[derive(Debug, Serialize)]
pub struct AppRegion {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
    #[serde(rename = "dateUpdated")]
    pub date_updated: String,
}

impl From<Region> for AppRegion {
    fn from(rgn: Region) -> Self {
        Self {
            id: rgn.id.to_string(),
            user_id: rgn.user_id.to_string(),
            name: rgn.name,
            date_created: rgn.date_created.to_rfc3339(),
            date_updated: rgn.date_updated.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppNewRegion {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

impl AppNewRegion {
    pub fn into_core(self, user_id: Uuid) -> NewRegion {
        NewRegion { user_id, name: self.name }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppUpdateRegion {
    #[validate(length(min = 1))]
    pub name: Option<String>,
}

impl From<AppUpdateRegion> for UpdateRegion {
    fn from(app: AppUpdateRegion) -> Self {
        Self { name: app.name }
    }
}
