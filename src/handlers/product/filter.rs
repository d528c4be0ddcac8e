use std::collections::HashMap;

use crate::api::order::OrderBy;
use crate::api::params;
use crate::error::ApiError;
use crate::services::product::{self, ProductFilter};

const ORDER_BY_FIELDS: &[(&str, &str)] = &[
    ("product_id", product::ORDER_BY_PRODUCT_ID),
    ("user_id", product::ORDER_BY_USER_ID),
    ("name", product::ORDER_BY_NAME),
    ("cost", product::ORDER_BY_COST),
    ("quantity", product::ORDER_BY_QUANTITY),
];

pub fn parse_filter(values: &HashMap<String, String>) -> Result<ProductFilter, ApiError> {
    Ok(ProductFilter {
        id: params::uuid(values, "product_id")?,
        user_id: params::uuid(values, "user_id")?,
        name: params::string(values, "name"),
        cost: params::parsed(values, "cost")?,
        quantity: params::parsed(values, "quantity")?,
    })
}

pub fn parse_order(values: &HashMap<String, String>) -> Result<OrderBy, ApiError> {
    OrderBy::parse(values, product::default_order_by(), ORDER_BY_FIELDS)
}
