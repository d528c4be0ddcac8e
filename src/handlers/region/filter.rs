use std::collections::HashMap;

use crate::api::order::OrderBy;
use crate::api::params;
use crate::error::ApiError;
use crate::services::region::{self, RegionFilter};

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    ("region_id", region::ORDER_BY_REGION_ID),
    ("user_id", region::ORDER_BY_USER_ID),
    ("name", region::ORDER_BY_NAME),
];

pub fn parse_filter(values: &HashMap<String, String>) -> Result<RegionFilter, ApiError> {
    Ok(RegionFilter {
        id: params::uuid(values, "region_id")?,
        user_id: params::uuid(values, "user_id")?,
        name: params::string(values, "name"),
        start_created_date: params::date(values, "start_created_date")?,
        end_created_date: params::date(values, "end_created_date")?,
    })
}

pub fn parse_order(values: &HashMap<String, String>) -> Result<OrderBy, ApiError> {
    OrderBy::parse(values, region::default_order_by(), ORDER_BY_FIELDS)
}
