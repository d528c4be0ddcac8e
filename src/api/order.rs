use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Query-string key carrying `field[,ASC|DESC]`.
pub const ORDER_BY_KEY: &str = "orderBy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

/// Field and direction to sort a query by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self { field: field.into(), direction }
    }

    /// Parse `orderBy` from the query string.
    ///
    /// `fields` maps the names clients may send to the names the service
    /// layer understands; anything outside it is a field error.
    pub fn parse(
        params: &HashMap<String, String>,
        default: OrderBy,
        fields: &[(&str, &str)],
    ) -> Result<OrderBy, ApiError> {
        let requested = match params.get(ORDER_BY_KEY).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            None => default,
            Some(raw) => {
                let mut parts = raw.split(',').map(str::trim);
                let field = parts.next().unwrap_or_default().to_string();
                let direction = match parts.next() {
                    None => Direction::Asc,
                    Some(dir) => Direction::parse(dir).ok_or_else(|| {
                        ApiError::field_error(ORDER_BY_KEY, format!("unknown direction: {}", dir))
                    })?,
                };
                if parts.next().is_some() {
                    return Err(ApiError::field_error(ORDER_BY_KEY, "expected field,direction"));
                }
                OrderBy { field, direction }
            }
        };

        let mapped = fields
            .iter()
            .find(|(name, _)| *name == requested.field)
            .map(|(_, field)| *field)
            .ok_or_else(|| ApiError::field_error(requested.field.clone(), "order field does not exist"))?;

        Ok(OrderBy::new(mapped, requested.direction))
    }
}
