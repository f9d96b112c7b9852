use serde_json::Value;

use crate::db::models::{JournalActivite, ADMIN_TABLES};
use crate::db::rows::{Row, RowSource, Table};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Create,
    Update,
    Delete,
}

impl AdminAction {
    fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Create => "create",
            AdminAction::Update => "update",
            AdminAction::Delete => "delete",
        }
    }
}

/// Columns that must be present on create and may not be nulled on update.
fn required_columns(table: &str) -> &'static [&'static str] {
    match table {
        "actualites" | "documents" | "conseils" => &["titre"],
        "services" => &["nom"],
        "chiffres_cles" => &["libelle", "valeur"],
        "entites_cartographie" => &["nom", "type_entite", "latitude", "longitude"],
        "baremes" => &["impot", "tranche_min", "taux"],
        "journal_activites" => &["action", "table_cible"],
        "messages" => &["nom", "email", "contenu"],
        _ => &[],
    }
}

/// Check a row payload against the table's required columns.
pub fn validate_payload(table: &str, action: AdminAction, payload: &Row) -> Result<(), AppError> {
    let Value::Object(fields) = payload else {
        return Err(AppError::BadRequest("payload must be a JSON object".into()));
    };

    for column in required_columns(table) {
        let value = fields.get(*column);
        let missing = match action {
            AdminAction::Create => value.map_or(true, Value::is_null),
            AdminAction::Update => value.is_some_and(Value::is_null),
            AdminAction::Delete => false,
        };
        if missing {
            return Err(AppError::BadRequest(format!(
                "'{column}' is required for table '{table}'"
            )));
        }
    }
    Ok(())
}

/// Compare the `Authorization: Bearer <token>` value with the expected service token.
pub fn check_service_token(authorization: Option<&str>, expected: &str) -> Result<(), AppError> {
    let provided = authorization
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    match provided {
        Some(token) if !expected.is_empty() && token == expected => Ok(()),
        Some(_) => Err(AppError::Auth("Invalid service token".into())),
        None => Err(AppError::Auth("Missing service token".into())),
    }
}

/// Apply one admin write and record it in the activity journal.
///
/// Returns the stored row for create and update. Journal failures are
/// logged and do not fail the write.
pub async fn process_admin_write(
    rows: &dyn RowSource,
    action: AdminAction,
    table: &str,
    id: Option<&str>,
    payload: Option<Row>,
) -> Result<Option<Row>, AppError> {
    if !ADMIN_TABLES.contains(&table) {
        return Err(AppError::NotFound(format!("Unknown table '{table}'")));
    }

    let result = match (action, id, payload) {
        (AdminAction::Create, _, Some(payload)) => {
            validate_payload(table, action, &payload)?;
            Some(rows.insert_row(table, payload).await?)
        }
        (AdminAction::Update, Some(id), Some(payload)) => {
            validate_payload(table, action, &payload)?;
            Some(rows.update_row(table, id, payload).await?)
        }
        (AdminAction::Delete, Some(id), _) => {
            rows.delete_row(table, id).await?;
            None
        }
        _ => {
            return Err(AppError::BadRequest(format!(
                "Incomplete {} request for '{table}'",
                action.as_str()
            )))
        }
    };

    let element_id = id.map(str::to_string).or_else(|| {
        result
            .as_ref()
            .and_then(|row| row.get("id"))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    });

    tracing::info!(table, action = action.as_str(), ?element_id, "Admin write applied");

    if table != JournalActivite::NAME {
        record_activity(rows, action, table, element_id).await;
    }

    Ok(result)
}

async fn record_activity(
    rows: &dyn RowSource,
    action: AdminAction,
    table: &str,
    element_id: Option<String>,
) {
    let entry = JournalActivite {
        id: None,
        action: action.as_str().to_string(),
        table_cible: table.to_string(),
        element_id,
        details: None,
        created_at: None,
    };

    let row = match serde_json::to_value(&entry) {
        Ok(row) => row,
        Err(e) => {
            tracing::warn!("Failed to encode journal entry: {e}");
            return;
        }
    };

    if let Err(e) = rows.insert_row(JournalActivite::NAME, row).await {
        tracing::warn!(table, "Failed to record admin activity: {e}");
    }
}

#[cfg(feature = "ssr")]
fn authorize(
    state: &crate::state::AppState,
    headers: &axum::http::HeaderMap,
) -> Result<(), AppError> {
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    check_service_token(authorization, &state.service_token)
}

/// Axum handler for `POST /api/v1/admin/{table}`.
#[cfg(feature = "ssr")]
pub async fn create_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(table): axum::extract::Path<String>,
    headers: axum::http::HeaderMap,
    axum::Json(payload): axum::Json<Value>,
) -> Result<(axum::http::StatusCode, axum::Json<Value>), AppError> {
    authorize(&state, &headers)?;
    let row = process_admin_write(
        state.rows.as_ref(),
        AdminAction::Create,
        &table,
        None,
        Some(payload),
    )
    .await?;
    Ok((
        axum::http::StatusCode::CREATED,
        axum::Json(row.unwrap_or(Value::Null)),
    ))
}

/// Axum handler for `PUT /api/v1/admin/{table}/{id}`.
#[cfg(feature = "ssr")]
pub async fn update_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path((table, id)): axum::extract::Path<(String, String)>,
    headers: axum::http::HeaderMap,
    axum::Json(payload): axum::Json<Value>,
) -> Result<axum::Json<Value>, AppError> {
    authorize(&state, &headers)?;
    let row = process_admin_write(
        state.rows.as_ref(),
        AdminAction::Update,
        &table,
        Some(&id),
        Some(payload),
    )
    .await?;
    Ok(axum::Json(row.unwrap_or(Value::Null)))
}

/// Axum handler for `DELETE /api/v1/admin/{table}/{id}`.
#[cfg(feature = "ssr")]
pub async fn delete_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path((table, id)): axum::extract::Path<(String, String)>,
    headers: axum::http::HeaderMap,
) -> Result<axum::http::StatusCode, AppError> {
    authorize(&state, &headers)?;
    process_admin_write(
        state.rows.as_ref(),
        AdminAction::Delete,
        &table,
        Some(&id),
        None,
    )
    .await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryRowSource;
    use crate::db::rows::MockRowSource;
    use serde_json::json;

    #[test]
    fn test_service_token() {
        assert!(check_service_token(Some("Bearer secret"), "secret").is_ok());
        assert!(matches!(
            check_service_token(Some("Bearer nope"), "secret"),
            Err(AppError::Auth(_))
        ));
        assert!(matches!(
            check_service_token(Some("secret"), "secret"),
            Err(AppError::Auth(_))
        ));
        assert!(matches!(
            check_service_token(None, "secret"),
            Err(AppError::Auth(_))
        ));
        assert!(check_service_token(Some("Bearer "), "").is_err());
    }

    #[test]
    fn test_validate_payload() {
        assert!(validate_payload("services", AdminAction::Create, &json!({"nom": "Vignette"})).is_ok());
        assert!(validate_payload("services", AdminAction::Create, &json!({"nom": null})).is_err());
        assert!(validate_payload("services", AdminAction::Create, &json!({})).is_err());
        assert!(validate_payload("services", AdminAction::Update, &json!({"description": "x"})).is_ok());
        assert!(validate_payload("services", AdminAction::Update, &json!({"nom": null})).is_err());
        assert!(validate_payload("services", AdminAction::Create, &json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_create_records_activity() {
        let rows = MemoryRowSource::new();
        let created = process_admin_write(
            &rows,
            AdminAction::Create,
            "actualites",
            None,
            Some(json!({"titre": "Nouvelle campagne", "contenu": "**Important**"})),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(created["id"], 1);

        let journal = rows.rows("journal_activites");
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0]["action"], "create");
        assert_eq!(journal[0]["table_cible"], "actualites");
        assert_eq!(journal[0]["element_id"], "1");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let rows = MemoryRowSource::new();
        rows.seed("services", vec![json!({"id": 4, "nom": "Vignette"})]);

        let updated = process_admin_write(
            &rows,
            AdminAction::Update,
            "services",
            Some("4"),
            Some(json!({"description": "Taxe annuelle"})),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated["description"], "Taxe annuelle");

        let deleted = process_admin_write(&rows, AdminAction::Delete, "services", Some("4"), None)
            .await
            .unwrap();
        assert!(deleted.is_none());
        assert!(rows.rows("services").is_empty());
        assert_eq!(rows.rows("journal_activites").len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_table_rejected() {
        let rows = MemoryRowSource::new();
        let result =
            process_admin_write(&rows, AdminAction::Create, "pg_user", None, Some(json!({}))).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_without_id_rejected() {
        let rows = MemoryRowSource::new();
        let result = process_admin_write(
            &rows,
            AdminAction::Update,
            "services",
            None,
            Some(json!({"nom": "x"})),
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_journal_failure_does_not_fail_write() {
        let mut rows = MockRowSource::new();
        rows.expect_insert_row()
            .withf(|table, _| table == "conseils")
            .times(1)
            .returning(|_, row| Ok(row));
        rows.expect_insert_row()
            .withf(|table, _| table == "journal_activites")
            .times(1)
            .returning(|_, _| Err(AppError::Backend("journal offline".into())));

        let result = process_admin_write(
            &rows,
            AdminAction::Create,
            "conseils",
            None,
            Some(json!({"id": 12, "titre": "Déclarez à temps"})),
        )
        .await;
        assert!(result.is_ok());
    }
}
