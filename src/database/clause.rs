use sqlx::{Encode, Postgres, QueryBuilder, Type};

use crate::api::order::OrderBy;
use crate::database::manager::DatabaseError;

/// Appends `WHERE a AND b AND ...` predicates to a query builder, binding
/// every value as a parameter.
pub struct WhereClause<'b, 'args> {
    builder: &'b mut QueryBuilder<'args, Postgres>,
    count: usize,
}

impl<'b, 'args> WhereClause<'b, 'args> {
    pub fn new(builder: &'b mut QueryBuilder<'args, Postgres>) -> Self {
        Self { builder, count: 0 }
    }

    /// Push `<expr><bound value>`, e.g. `push("name LIKE ", pattern)`.
    pub fn push<T>(&mut self, expr: &str, value: T) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        self.builder.push(if self.count == 0 { " WHERE " } else { " AND " });
        self.builder.push(expr);
        self.builder.push_bind(value);
        self.count += 1;
        self
    }

    /// Like `push`, but the bound value sits inside `prefix ... suffix`.
    pub fn push_wrapped<T>(&mut self, prefix: &str, value: T, suffix: &str) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        self.push(prefix, value);
        self.builder.push(suffix);
        self
    }

    /// `<column> LIKE '%value%'` with the value's own wildcards escaped.
    pub fn push_contains(&mut self, column: &str, value: &str) -> &mut Self {
        self.push_wrapped(&format!("{} LIKE ", column), like_contains(value), " ESCAPE '\\'")
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Substring pattern for LIKE; `%`, `_` and `\` in `value` match literally.
pub fn like_contains(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Resolve an order-by against the store's whitelist of columns.
pub fn order_by_clause(order_by: &OrderBy, fields: &[(&str, &str)]) -> Result<String, DatabaseError> {
    let column = fields
        .iter()
        .find(|(field, _)| *field == order_by.field)
        .map(|(_, column)| *column)
        .ok_or_else(|| DatabaseError::QueryError(format!("field {:?} does not exist", order_by.field)))?;

    Ok(format!(" ORDER BY {} {}", column, order_by.direction.to_sql()))
}

/// Append `OFFSET ... ROWS FETCH NEXT ... ROWS ONLY` for 1-based pages.
pub fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page_number: u32, rows_per_page: u32) {
    let offset = i64::from(page_number.saturating_sub(1)) * i64::from(rows_per_page);
    builder.push(" OFFSET ");
    builder.push_bind(offset);
    builder.push(" ROWS FETCH NEXT ");
    builder.push_bind(i64::from(rows_per_page));
    builder.push(" ROWS ONLY");
}
