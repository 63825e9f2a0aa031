//! Standard list query builder: field equality, sorting and pagination.
//!
//! # Responsibility
//! - Validate caller-provided column names against an allow-list.
//! - Produce a [`SelectQuery`] with bound filter values.
//!
//! # Invariants
//! - Only allow-listed columns and envelope columns reach rendered SQL.
//! - Limit is always clamped to `[1, max_limit]` when present.
//! - Any explicit sort is tie-broken by `id ASC` for stable pages.

use super::{ListQueryBuilder, QueryBuildError, SelectQuery, SortOrder};
use crate::id::RecordId;
use crate::model::envelope::ENVELOPE_COLUMNS;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_MAX_LIMIT: u32 = 500;

static COLUMN_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid column name regex"));

/// Scalar value matched with equality (or `IS NULL` for `Null`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Caller params understood by [`FieldFilterBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Column -> required value. All entries must match.
    pub filters: BTreeMap<String, FilterValue>,
    /// `column`, `column:asc` or `column:desc`.
    pub sort: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ListParams {
    pub fn with_filter(mut self, column: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(column.into(), value);
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }
}

/// Allow-list based [`ListQueryBuilder`] usable by any resource.
#[derive(Debug, Clone)]
pub struct FieldFilterBuilder {
    columns: Vec<&'static str>,
    default_order: Option<(&'static str, SortOrder)>,
    default_limit: Option<u32>,
    max_limit: u32,
}

impl FieldFilterBuilder {
    /// Creates a builder accepting `columns` plus the envelope columns.
    ///
    /// # Errors
    /// - Returns `InvalidColumnName` when a configured column is not a plain
    ///   SQL identifier.
    pub fn new(columns: &[&'static str]) -> Result<Self, QueryBuildError> {
        for column in columns {
            ensure_identifier(column)?;
        }

        Ok(Self {
            columns: columns.to_vec(),
            default_order: None,
            default_limit: None,
            max_limit: DEFAULT_MAX_LIMIT,
        })
    }

    /// Order applied when params carry no sort.
    pub fn with_default_order(
        mut self,
        column: &'static str,
        order: SortOrder,
    ) -> Result<Self, QueryBuildError> {
        self.ensure_known(column)?;
        self.default_order = Some((column, order));
        Ok(self)
    }

    /// Page size used when params carry no limit, and the hard upper bound.
    pub fn with_page_size(mut self, default_limit: u32, max_limit: u32) -> Self {
        self.max_limit = max_limit.max(1);
        self.default_limit = Some(default_limit.clamp(1, self.max_limit));
        self
    }

    fn ensure_known<'a>(&self, column: &'a str) -> Result<&'a str, QueryBuildError> {
        ensure_identifier(column)?;
        let known = self
            .columns
            .iter()
            .chain(ENVELOPE_COLUMNS)
            .any(|candidate| *candidate == column);
        if known {
            Ok(column)
        } else {
            Err(QueryBuildError::UnknownColumn(column.to_string()))
        }
    }

    fn parse_sort<'a>(&self, spec: &'a str) -> Result<(&'a str, SortOrder), QueryBuildError> {
        let (column, direction) = match spec.split_once(':') {
            Some((column, direction)) => (column.trim(), Some(direction.trim())),
            None => (spec.trim(), None),
        };
        if column.is_empty() {
            return Err(QueryBuildError::InvalidSort(spec.to_string()));
        }

        let order = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => SortOrder::Asc,
            Some("desc") => SortOrder::Desc,
            Some(_) => return Err(QueryBuildError::InvalidSort(spec.to_string())),
        };

        Ok((self.ensure_known(column)?, order))
    }
}

impl ListQueryBuilder for FieldFilterBuilder {
    type Params = ListParams;

    fn build_query(&self, params: &ListParams) -> Result<SelectQuery, QueryBuildError> {
        let mut query = SelectQuery::new();

        for (column, value) in &params.filters {
            let column = self.ensure_known(column)?;
            query = match filter_value_to_sql(column, value)? {
                Some(bound) => query.and_where(format!("{column} = ?"), [bound]),
                None => query.and_where(format!("{column} IS NULL"), []),
            };
        }

        let order = match params.sort.as_deref() {
            Some(spec) => Some(self.parse_sort(spec)?),
            None => self.default_order,
        };
        if let Some((column, direction)) = order {
            query = query.order_by(column, direction);
            if column != "id" {
                query = query.order_by("id", SortOrder::Asc);
            }
        }

        let limit = params
            .limit
            .or(self.default_limit)
            .map(|limit| limit.clamp(1, self.max_limit));
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        Ok(query.offset(params.offset))
    }
}

fn ensure_identifier(column: &str) -> Result<(), QueryBuildError> {
    if COLUMN_NAME_RE.is_match(column) {
        Ok(())
    } else {
        Err(QueryBuildError::InvalidColumnName(column.to_string()))
    }
}

fn filter_value_to_sql(column: &str, value: &FilterValue) -> Result<Option<Value>, QueryBuildError> {
    // Ids are stored as 16-byte blobs but exchanged as text.
    if column == "id" {
        return match value {
            FilterValue::Text(text) => RecordId::parse(text)
                .map(|id| Some(Value::Blob(id.to_binary().to_vec())))
                .map_err(|err| QueryBuildError::InvalidValue {
                    column: column.to_string(),
                    message: err.to_string(),
                }),
            _ => Err(QueryBuildError::InvalidValue {
                column: column.to_string(),
                message: "id filters require uuid text".to_string(),
            }),
        };
    }

    Ok(match value {
        FilterValue::Null => None,
        FilterValue::Bool(flag) => Some(Value::Integer(i64::from(*flag))),
        FilterValue::Integer(number) => Some(Value::Integer(*number)),
        FilterValue::Real(number) => Some(Value::Real(*number)),
        FilterValue::Text(text) => Some(Value::Text(text.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::{FieldFilterBuilder, FilterValue, ListParams};
    use crate::id::RecordId;
    use crate::query::{ListQueryBuilder, QueryBuildError, SortOrder};
    use rusqlite::types::Value;

    fn builder() -> FieldFilterBuilder {
        FieldFilterBuilder::new(&["name", "size", "archived"]).unwrap()
    }

    #[test]
    fn empty_params_produce_unfiltered_query() {
        let query = builder().build_query(&ListParams::default()).unwrap();
        assert!(query.predicates().is_empty());
        assert!(query.ordering().is_empty());
        assert_eq!(query.page(), (None, 0));
    }

    #[test]
    fn filters_bind_values_in_column_order() {
        let params = ListParams::default()
            .with_filter("size", FilterValue::Integer(3))
            .with_filter("archived", FilterValue::Bool(true))
            .with_filter("name", FilterValue::Null);
        let query = builder().build_query(&params).unwrap();

        let (sql, values) = query.to_select_sql("widgets", &["id"]);
        assert_eq!(
            sql,
            "SELECT id FROM widgets WHERE (archived = ?) AND (name IS NULL) AND (size = ?)"
        );
        assert_eq!(values, vec![Value::Integer(1), Value::Integer(3)]);
    }

    #[test]
    fn sort_spec_adds_id_tiebreak() {
        let params = ListParams::default().with_sort("name:DESC");
        let query = builder().build_query(&params).unwrap();
        assert_eq!(
            query.ordering(),
            &[
                ("name".to_string(), SortOrder::Desc),
                ("id".to_string(), SortOrder::Asc)
            ]
        );
    }

    #[test]
    fn default_order_applies_without_sort() {
        let builder = builder()
            .with_default_order("created_at", SortOrder::Desc)
            .unwrap();
        let query = builder.build_query(&ListParams::default()).unwrap();
        assert_eq!(query.ordering()[0], ("created_at".to_string(), SortOrder::Desc));
    }

    #[test]
    fn limit_is_clamped_and_defaulted() {
        let builder = builder().with_page_size(10, 50);

        let query = builder.build_query(&ListParams::default()).unwrap();
        assert_eq!(query.page(), (Some(10), 0));

        let query = builder
            .build_query(&ListParams::default().with_page(500, 5))
            .unwrap();
        assert_eq!(query.page(), (Some(50), 5));

        let query = builder
            .build_query(&ListParams::default().with_page(0, 0))
            .unwrap();
        assert_eq!(query.page(), (Some(1), 0));
    }

    #[test]
    fn id_filter_is_converted_to_binary() {
        let id = RecordId::generate();
        let params = ListParams::default().with_filter("id", FilterValue::Text(id.to_string()));
        let query = builder().build_query(&params).unwrap();

        let (_, values) = query.to_select_sql("widgets", &["id"]);
        assert_eq!(values, vec![Value::Blob(id.to_binary().to_vec())]);

        let bad = ListParams::default().with_filter("id", FilterValue::Text("nope".to_string()));
        assert!(matches!(
            builder().build_query(&bad),
            Err(QueryBuildError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_unknown_and_malformed_columns() {
        let unknown = ListParams::default().with_filter("owner", FilterValue::Integer(1));
        assert_eq!(
            builder().build_query(&unknown).unwrap_err(),
            QueryBuildError::UnknownColumn("owner".to_string())
        );

        let injected = ListParams::default().with_sort("name; DROP TABLE widgets");
        assert_eq!(
            builder().build_query(&injected).unwrap_err(),
            QueryBuildError::InvalidColumnName("name; DROP TABLE widgets".to_string())
        );

        let direction = ListParams::default().with_sort("name:sideways");
        assert_eq!(
            builder().build_query(&direction).unwrap_err(),
            QueryBuildError::InvalidSort("name:sideways".to_string())
        );

        assert!(FieldFilterBuilder::new(&["bad column"]).is_err());
    }
}
