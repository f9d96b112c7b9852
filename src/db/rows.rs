use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A raw backend row. Decoded into a typed DTO at the fetch boundary.
pub type Row = serde_json::Value;

/// Comparison operators understood by the row API (PostgREST names).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    Is,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::Ilike => "ilike",
            FilterOp::Is => "is",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read request against one backend table.
///
/// ```
/// use drnoflu::db::rows::RowQuery;
///
/// let query = RowQuery::table("actualites")
///     .eq("publie", "true")
///     .order_by("date_publication", false)
///     .limit(10);
/// assert_eq!(query.table_name(), "actualites");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    table: String,
    filters: Vec<Filter>,
    order: Option<Order>,
    limit: Option<usize>,
}

impl RowQuery {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn filter(mut self, column: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Encode the query as PostgREST query-string pairs.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];

        for filter in &self.filters {
            pairs.push((
                filter.column.clone(),
                format!("{}.{}", filter.op.as_str(), filter.value),
            ));
        }

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }

        pairs
    }
}

/// Row-level access to the hosted backend.
///
/// Abstracted as a trait so pages, search and tests share one seam.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Read the rows matching `query`.
    async fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<Row>, AppError>;

    /// Insert a row and return it as stored (with generated columns).
    async fn insert_row(&self, table: &str, row: Row) -> Result<Row, AppError>;

    /// Patch the row whose `id` column equals `id`.
    async fn update_row(&self, table: &str, id: &str, patch: Row) -> Result<Row, AppError>;

    /// Delete the row whose `id` column equals `id`.
    async fn delete_row(&self, table: &str, id: &str) -> Result<(), AppError>;
}

/// A typed DTO bound to one backend table.
pub trait Table: DeserializeOwned + Serialize + Send {
    /// Backend table name.
    const NAME: &'static str;
}

/// Decode raw rows into `T`, logging and skipping rows that do not fit.
pub fn decode_rows<T: Table>(rows: Vec<Row>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(table = T::NAME, "Skipping malformed row: {e}");
                None
            }
        })
        .collect()
}

/// Fetch and decode rows of `T`'s table. The query's table name is replaced by `T::NAME`.
pub async fn fetch_typed<T: Table>(
    source: &dyn RowSource,
    query: RowQuery,
) -> Result<Vec<T>, AppError> {
    let query = RowQuery {
        table: T::NAME.to_string(),
        ..query
    };
    let rows = source.fetch_rows(&query).await?;
    Ok(decode_rows(rows))
}
