use std::collections::HashMap;

use crate::api::order::OrderBy;
use crate::api::params;
use crate::error::ApiError;
use crate::services::user::{self, UserFilter};

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    ("user_id", user::ORDER_BY_USER_ID),
    ("name", user::ORDER_BY_NAME),
    ("email", user::ORDER_BY_EMAIL),
    ("roles", user::ORDER_BY_ROLES),
    ("enabled", user::ORDER_BY_ENABLED),
];

pub fn parse_filter(values: &HashMap<String, String>) -> Result<UserFilter, ApiError> {
    Ok(UserFilter {
        id: params::uuid(values, "user_id")?,
        name: params::string(values, "name"),
        email: params::string(values, "email"),
        start_created_date: params::date(values, "start_created_date")?,
        end_created_date: params::date(values, "end_created_date")?,
    })
}

pub fn parse_order(values: &HashMap<String, String>) -> Result<OrderBy, ApiError> {
    OrderBy::parse(values, user::default_order_by(), ORDER_BY_FIELDS)
}
