use std::collections::HashMap;

use crate::api::order::OrderBy;
use crate::api::params;
use crate::error::ApiError;
use crate::services::condition::{self, ConditionFilter};

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    ("condition_id", condition::ORDER_BY_CONDITION_ID),
    ("user_id", condition::ORDER_BY_USER_ID),
    ("name", condition::ORDER_BY_NAME),
];

pub fn parse_filter(values: &HashMap<String, String>) -> Result<ConditionFilter, ApiError> {
    Ok(ConditionFilter {
        id: params::uuid(values, "condition_id")?,
        user_id: params::uuid(values, "user_id")?,
        name: params::string(values, "name"),
        start_created_date: params::date(values, "start_created_date")?,
        end_created_date: params::date(values, "end_created_date")?,
    })
}

pub fn parse_order(values: &HashMap<String, String>) -> Result<OrderBy, ApiError> {
    OrderBy::parse(values, condition::default_order_by(), ORDER_BY_FIELDS)
}
