use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::db::rows::{Filter, FilterOp, Row, RowQuery, RowSource};
use crate::error::AppError;

/// In-memory `RowSource` used for demo mode and tests.
///
/// Rows keep insertion order. Inserted rows without an `id` get the next
/// integer id of their table.
#[derive(Default)]
pub struct MemoryRowSource {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    failing: RwLock<Vec<String>>,
}

impl MemoryRowSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of `table`.
    pub fn seed(&self, table: &str, rows: Vec<Row>) {
        if let Ok(mut tables) = self.tables.write() {
            tables.insert(table.to_string(), rows);
        }
    }

    /// Make every request against `table` fail with a backend error.
    pub fn fail_table(&self, table: &str) {
        if let Ok(mut failing) = self.failing.write() {
            failing.push(table.to_string());
        }
    }

    /// Snapshot of the rows currently stored in `table`.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .ok()
            .and_then(|tables| tables.get(table).cloned())
            .unwrap_or_default()
    }

    fn check_available(&self, table: &str) -> Result<(), AppError> {
        let failing = self
            .failing
            .read()
            .map_err(|_| AppError::Internal("row store lock poisoned".into()))?;
        if failing.iter().any(|t| t == table) {
            return Err(AppError::Backend(format!("table '{table}' unavailable")));
        }
        Ok(())
    }
}

fn id_matches(row: &Row, id: &str) -> bool {
    match row.get("id") {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_to_literal(value: &Value, literal: &str) -> Option<Ordering> {
    match value {
        Value::Number(n) => {
            let lhs = n.as_f64()?;
            let rhs = literal.parse::<f64>().ok()?;
            lhs.partial_cmp(&rhs)
        }
        Value::Null => None,
        other => Some(value_as_text(other).as_str().cmp(literal)),
    }
}

/// SQL `LIKE` with `%` wildcards (PostgREST also accepts `*`).
fn like_matches(text: &str, pattern: &str) -> bool {
    let pattern = pattern.replace('*', "%");
    let parts: Vec<&str> = pattern.split('%').collect();
    if parts.len() == 1 {
        return text == pattern;
    }

    let mut rest = text;
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if index == 0 {
            match rest.strip_prefix(part) {
                Some(tail) => rest = tail,
                None => return false,
            }
        } else if index == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}

fn filter_matches(row: &Row, filter: &Filter) -> bool {
    let value = row.get(&filter.column).unwrap_or(&Value::Null);
    match filter.op {
        FilterOp::Eq => !value.is_null() && value_as_text(value) == filter.value,
        FilterOp::Neq => value.is_null() || value_as_text(value) != filter.value,
        FilterOp::Gt => compare_to_literal(value, &filter.value) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(
            compare_to_literal(value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lt => compare_to_literal(value, &filter.value) == Some(Ordering::Less),
        FilterOp::Lte => matches!(
            compare_to_literal(value, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOp::Like => !value.is_null() && like_matches(&value_as_text(value), &filter.value),
        FilterOp::Ilike => {
            !value.is_null()
                && like_matches(
                    &value_as_text(value).to_lowercase(),
                    &filter.value.to_lowercase(),
                )
        }
        FilterOp::Is => match filter.value.as_str() {
            "null" => value.is_null(),
            "true" => value == &Value::Bool(true),
            "false" => value == &Value::Bool(false),
            _ => false,
        },
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => value_as_text(a).cmp(&value_as_text(b)),
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    async fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<Row>, AppError> {
        self.check_available(query.table_name())?;

        let mut rows: Vec<Row> = self
            .rows(query.table_name())
            .into_iter()
            .filter(|row| query.filters().iter().all(|f| filter_matches(row, f)))
            .collect();

        if let Some(order) = query.order() {
            let null = Value::Null;
            rows.sort_by(|a, b| {
                let lhs = a.get(&order.column).unwrap_or(&null);
                let rhs = b.get(&order.column).unwrap_or(&null);
                let ordering = compare_values(lhs, rhs);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if let Some(limit) = query.row_limit() {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert_row(&self, table: &str, mut row: Row) -> Result<Row, AppError> {
        self.check_available(table)?;

        let Value::Object(fields) = &mut row else {
            return Err(AppError::BadRequest("row must be a JSON object".into()));
        };

        let mut tables = self
            .tables
            .write()
            .map_err(|_| AppError::Internal("row store lock poisoned".into()))?;
        let rows = tables.entry(table.to_string()).or_default();

        if !fields.contains_key("id") {
            let next_id = rows
                .iter()
                .filter_map(|r| r.get("id").and_then(Value::as_i64))
                .max()
                .unwrap_or(0)
                + 1;
            fields.insert("id".to_string(), Value::from(next_id));
        }

        rows.push(row.clone());
        Ok(row)
    }

    async fn update_row(&self, table: &str, id: &str, patch: Row) -> Result<Row, AppError> {
        self.check_available(table)?;

        let Value::Object(patch_fields) = patch else {
            return Err(AppError::BadRequest("patch must be a JSON object".into()));
        };

        let mut tables = self
            .tables
            .write()
            .map_err(|_| AppError::Internal("row store lock poisoned".into()))?;
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|row| id_matches(row, id)))
            .ok_or_else(|| AppError::NotFound(format!("{table}/{id}")))?;

        if let Value::Object(fields) = &mut *row {
            for (key, value) in patch_fields {
                if key != "id" {
                    fields.insert(key, value);
                }
            }
        }

        Ok(row.clone())
    }

    async fn delete_row(&self, table: &str, id: &str) -> Result<(), AppError> {
        self.check_available(table)?;

        let mut tables = self
            .tables
            .write()
            .map_err(|_| AppError::Internal("row store lock poisoned".into()))?;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| AppError::NotFound(format!("{table}/{id}")))?;

        let before = rows.len();
        rows.retain(|row| !id_matches(row, id));
        if rows.len() == before {
            return Err(AppError::NotFound(format!("{table}/{id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> MemoryRowSource {
        let source = MemoryRowSource::new();
        source.seed(
            "documents",
            vec![
                json!({"id": 1, "titre": "Arrêté fiscal", "annee": 2021, "categorie": "arrete"}),
                json!({"id": 2, "titre": "Décret provincial", "annee": 2023, "categorie": "decret"}),
                json!({"id": 3, "titre": "Édit budgétaire", "annee": 2019, "categorie": null}),
            ],
        );
        source
    }

    #[test]
    fn test_like_matches() {
        assert!(like_matches("Arrêté fiscal", "%fiscal"));
        assert!(like_matches("Arrêté fiscal", "Arr%"));
        assert!(like_matches("Arrêté fiscal", "%té f%"));
        assert!(like_matches("abc", "abc"));
        assert!(!like_matches("abc", "%d%"));
        assert!(like_matches("abc", "*b*"));
    }

    #[tokio::test]
    async fn test_filters_order_and_limit() {
        let source = source();
        let query = RowQuery::table("documents")
            .filter("annee", FilterOp::Gte, "2020")
            .order_by("annee", false)
            .limit(1);
        let rows = source.fetch_rows(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 2);
    }

    #[tokio::test]
    async fn test_eq_and_is_null() {
        let source = source();
        let rows = source
            .fetch_rows(&RowQuery::table("documents").eq("categorie", "arrete"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let rows = source
            .fetch_rows(&RowQuery::table("documents").filter("categorie", FilterOp::Is, "null"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 3);
    }

    #[tokio::test]
    async fn test_insert_assigns_next_id() {
        let source = source();
        let row = source
            .insert_row("documents", json!({"titre": "Nouveau"}))
            .await
            .unwrap();
        assert_eq!(row["id"], 4);
        assert_eq!(source.rows("documents").len(), 4);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let source = source();
        let updated = source
            .update_row("documents", "2", json!({"titre": "Décret modifié", "id": 99}))
            .await
            .unwrap();
        assert_eq!(updated["titre"], "Décret modifié");
        assert_eq!(updated["id"], 2);

        source.delete_row("documents", "2").await.unwrap();
        assert!(matches!(
            source.delete_row("documents", "2").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failing_table() {
        let source = source();
        source.fail_table("documents");
        let result = source.fetch_rows(&RowQuery::table("documents")).await;
        assert!(matches!(result, Err(AppError::Backend(_))));
    }

    #[tokio::test]
    async fn test_unknown_table_is_empty() {
        let rows = source()
            .fetch_rows(&RowQuery::table("inconnue"))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
