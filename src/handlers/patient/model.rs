use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::services::patient::{NewPatient, Patient, UpdatePatient};

#[derive(Debug, Serialize)]
pub struct AppPatient {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
    pub age: i32,
    pub video_links: Vec<String>,
    pub condition: String,
    pub healed: bool,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
    #[serde(rename = "dateUpdated")]
    pub date_updated: String,
}

impl From<Patient> for AppPatient {
    fn from(pn: Patient) -> Self {
        Self {
            id: pn.id.to_string(),
            user_id: pn.user_id.to_string(),
            name: pn.name,
            age: pn.age,
            video_links: pn.video_links,
            condition: pn.condition,
            healed: pn.healed,
            date_created: pn.date_created.to_rfc3339(),
            date_updated: pn.date_updated.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppNewPatient {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0, max = 150))]
    pub age: i32,
    #[validate(length(min = 1, message = "at least one video link is required"))]
    pub video_links: Vec<String>,
    #[validate(length(min = 1, message = "condition is required"))]
    pub condition: String,
    #[serde(default)]
    pub healed: bool,
}

impl AppNewPatient {
    /// The owner always comes from the caller's claims.
    pub fn into_core(self, user_id: Uuid) -> NewPatient {
        NewPatient {
            user_id,
            name: self.name,
            age: self.age,
            video_links: self.video_links,
            condition: self.condition,
            healed: self.healed,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppUpdatePatient {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    pub video_links: Option<Vec<String>>,
    #[validate(length(min = 1))]
    pub condition: Option<String>,
    pub healed: Option<bool>,
}

impl From<AppUpdatePatient> for UpdatePatient {
    fn from(app: AppUpdatePatient) -> Self {
        Self {
            name: app.name,
            age: app.age,
            video_links: app.video_links,
            condition: app.condition,
            healed: app.healed,
        }
    }
}
