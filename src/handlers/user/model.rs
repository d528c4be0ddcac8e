use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::services::user::{NewUser, UpdateUser, User, UserRole};

#[derive(Debug, Serialize)]
pub struct AppUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub department: String,
    pub enabled: bool,
    #[serde(rename = "dateCreated")]
    pub date_created: String,
    #[serde(rename = "dateUpdated")]
    pub date_updated: String,
}

impl From<User> for AppUser {
    fn from(usr: User) -> Self {
        Self {
            id: usr.id.to_string(),
            name: usr.name,
            email: usr.email,
            roles: usr.roles.iter().map(|r| r.to_string()).collect(),
            department: usr.department.unwrap_or_default(),
            enabled: usr.enabled,
            date_created: usr.date_created.to_rfc3339(),
            date_updated: usr.date_updated.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppNewUser {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "at least one role is required"))]
    pub roles: Vec<UserRole>,
    pub department: Option<String>,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,
}

impl AppNewUser {
    pub fn into_core(self) -> Result<NewUser, ApiError> {
        confirm(Some(&self.password), Some(&self.password_confirm))?;

        Ok(NewUser {
            name: self.name,
            email: self.email,
            roles: self.roles,
            department: self.department.filter(|d| !d.is_empty()),
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AppUpdateUser {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "at least one role is required"))]
    pub roles: Option<Vec<UserRole>>,
    pub department: Option<String>,
    #[validate(length(min = 1))]
    pub password: Option<String>,
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: Option<String>,
    pub enabled: Option<bool>,
}

impl AppUpdateUser {
    pub fn into_core(self) -> Result<UpdateUser, ApiError> {
        confirm(self.password.as_deref(), self.password_confirm.as_deref())?;

        Ok(UpdateUser {
            name: self.name,
            email: self.email,
            roles: self.roles,
            department: self.department,
            password: self.password,
            enabled: self.enabled,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AppToken {
    pub token: String,
}

fn confirm(password: Option<&str>, password_confirm: Option<&str>) -> Result<(), ApiError> {
    if password.is_some() && password != password_confirm {
        return Err(ApiError::field_error("passwordConfirm", "passwords do not match"));
    }
    Ok(())
}
