use std::collections::HashMap;

use crate::api::order::OrderBy;
use crate::api::params;
use crate::error::ApiError;
use crate::services::role::{self, RoleFilter};

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    ("role_id", role::ORDER_BY_ROLE_ID),
    ("user_id", role::ORDER_BY_USER_ID),
    ("name", role::ORDER_BY_NAME),
];

pub fn parse_filter(values: &HashMap<String, String>) -> Result<RoleFilter, ApiError> {
    Ok(RoleFilter {
        id: params::uuid(values, "role_id")?,
        user_id: params::uuid(values, "user_id")?,
        name: params::string(values, "name"),
        start_created_date: params::date(values, "start_created_date")?,
        end_created_date: params::date(values, "end_created_date")?,
    })
}

pub fn parse_order(values: &HashMap<String, String>) -> Result<OrderBy, ApiError> {
    OrderBy::parse(values, role::default_order_by(), ORDER_BY_FIELDS)
}
