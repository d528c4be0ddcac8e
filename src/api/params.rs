use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;

// Query-string helpers shared by the per-entity filter parsers. Absent and
// empty values both mean "not filtered".

fn value<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub fn string(params: &HashMap<String, String>, key: &str) -> Option<String> {
    value(params, key).map(str::to_string)
}

pub fn uuid(params: &HashMap<String, String>, key: &str) -> Result<Option<Uuid>, ApiError> {
    value(params, key)
        .map(|v| Uuid::parse_str(v).map_err(|e| ApiError::field_error(key, e.to_string())))
        .transpose()
}

pub fn parsed<T>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value(params, key)
        .map(|v| v.parse::<T>().map_err(|e| ApiError::field_error(key, e.to_string())))
        .transpose()
}

pub fn date(params: &HashMap<String, String>, key: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    value(params, key)
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| ApiError::field_error(key, e.to_string()))
        })
        .transpose()
}
