//! List query descriptors and the builder capability that produces them.
//!
//! # Responsibility
//! - Describe a filtered, ordered, paged select without binding it to a table.
//! - Define the per-resource capability turning caller params into a query.
//!
//! # Invariants
//! - Predicate clauses use positional `?` placeholders only; values are bound,
//!   never interpolated.
//! - Rendering is deterministic for a given descriptor.

pub mod filter;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use filter::{FieldFilterBuilder, FilterValue, ListParams};

/// Ordering direction for one sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Store query descriptor produced by a [`ListQueryBuilder`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    predicates: Vec<String>,
    bind_values: Vec<Value>,
    order: Vec<(String, SortOrder)>,
    limit: Option<u32>,
    offset: u32,
}

impl SelectQuery {
    /// Unfiltered, unordered, unbounded query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one predicate, combined with earlier ones using `AND`.
    ///
    /// `values` must match the number of `?` placeholders in `clause`.
    pub fn and_where(
        mut self,
        clause: impl Into<String>,
        values: impl IntoIterator<Item = Value>,
    ) -> Self {
        self.predicates.push(clause.into());
        self.bind_values.extend(values);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.order.push((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    pub fn ordering(&self) -> &[(String, SortOrder)] {
        &self.order
    }

    pub fn page(&self) -> (Option<u32>, u32) {
        (self.limit, self.offset)
    }

    /// Renders a full `SELECT` over `table` and returns the bind values in
    /// placeholder order.
    pub fn to_select_sql(&self, table: &str, columns: &[&str]) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {} FROM {table}", columns.join(", "));
        let mut bind_values = self.bind_values.clone();

        if !self.predicates.is_empty() {
            let joined = self
                .predicates
                .iter()
                .map(|clause| format!("({clause})"))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&joined);
        }

        if !self.order.is_empty() {
            let joined = self
                .order
                .iter()
                .map(|(column, order)| format!("{column} {}", order.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&joined);
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if self.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(self.offset)));
            }
        } else if self.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(self.offset)));
        }

        (sql, bind_values)
    }
}

/// A list query could not be built from caller params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryBuildError {
    /// Name is not a plain SQL identifier.
    InvalidColumnName(String),
    /// Column is not filterable/sortable for this resource.
    UnknownColumn(String),
    /// Sort spec is not `column`, `column:asc` or `column:desc`.
    InvalidSort(String),
    /// A filter value cannot be used for its column.
    InvalidValue { column: String, message: String },
}

impl Display for QueryBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidColumnName(name) => write!(f, "invalid column name `{name}`"),
            Self::UnknownColumn(name) => write!(f, "column `{name}` is not filterable"),
            Self::InvalidSort(spec) => write!(f, "invalid sort spec `{spec}`"),
            Self::InvalidValue { column, message } => {
                write!(f, "invalid filter value for `{column}`: {message}")
            }
        }
    }
}

impl Error for QueryBuildError {}

/// Turns caller filter params into a [`SelectQuery`] for one resource type.
pub trait ListQueryBuilder {
    type Params;

    fn build_query(&self, params: &Self::Params) -> Result<SelectQuery, QueryBuildError>;
}

impl<B: ListQueryBuilder + ?Sized> ListQueryBuilder for &B {
    type Params = B::Params;

    fn build_query(&self, params: &Self::Params) -> Result<SelectQuery, QueryBuildError> {
        (**self).build_query(params)
    }
}

#[cfg(test)]
mod tests {
    use super::{SelectQuery, SortOrder};
    use rusqlite::types::Value;

    #[test]
    fn empty_query_renders_plain_select() {
        let (sql, values) = SelectQuery::new().to_select_sql("widgets", &["id", "name"]);
        assert_eq!(sql, "SELECT id, name FROM widgets");
        assert!(values.is_empty());
    }

    #[test]
    fn predicates_are_parenthesized_and_joined() {
        let query = SelectQuery::new()
            .and_where("name = ?", [Value::Text("a".to_string())])
            .and_where("size > ? OR size IS NULL", [Value::Integer(3)])
            .order_by("name", SortOrder::Desc)
            .order_by("id", SortOrder::Asc)
            .limit(10)
            .offset(20);

        let (sql, values) = query.to_select_sql("widgets", &["id"]);
        assert_eq!(
            sql,
            "SELECT id FROM widgets WHERE (name = ?) AND (size > ? OR size IS NULL) \
             ORDER BY name DESC, id ASC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            values,
            vec![
                Value::Text("a".to_string()),
                Value::Integer(3),
                Value::Integer(10),
                Value::Integer(20),
            ]
        );
    }

    #[test]
    fn offset_without_limit_uses_unbounded_limit() {
        let (sql, values) = SelectQuery::new().offset(5).to_select_sql("widgets", &["id"]);
        assert_eq!(sql, "SELECT id FROM widgets LIMIT -1 OFFSET ?");
        assert_eq!(values, vec![Value::Integer(5)]);
    }
}
