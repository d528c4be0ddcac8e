use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::services::product::{NewProduct, Product, UpdateProduct};

#[derive(Debug, Serialize)]
pub struct AppProduct {
    pub id: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub name: String,
    pub cost: f64,
    pub quantity: i32,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
    #[serde(rename = "dateUpdated")]
    pub date_updated: String,
}

impl From<Product> for AppProduct {
    fn from(prd: Product) -> Self {
        Self {
            id: prd.id.to_string(),
            user_id: prd.user_id.to_string(),
            name: prd.name,
            cost: prd.cost,
            quantity: prd.quantity,
            date_created: prd.date_created.to_rfc3339(),
            date_updated: prd.date_updated.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppNewProduct {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "cost cannot be negative"))]
    pub cost: f64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

impl AppNewProduct {
    pub fn into_core(self, user_id: Uuid) -> NewProduct {
        NewProduct {
            user_id,
            name: self.name,
            cost: self.cost,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppUpdateProduct {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(range(min = 0.0))]
    pub cost: Option<f64>,
    #[validate(range(min = 1))]
    pub quantity: Option<i32>,
}

impl From<AppUpdateProduct> for UpdateProduct {
    fn from(app: AppUpdateProduct) -> Self {
        Self {
            name: app.name,
            cost: app.cost,
            quantity: app.quantity,
        }
    }
}
