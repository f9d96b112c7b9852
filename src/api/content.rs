use serde::Deserialize;
use serde_json::Value;

use crate::db::models::{
    Actualite, Bareme, ChiffreCle, Conseil, DocumentOfficiel, EntiteCartographique, Service,
};
use crate::db::rows::{fetch_typed, RowQuery, RowSource, Table};
use crate::error::AppError;

/// Default and maximum page size for content listings.
const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
    /// Column to sort on; prefix with `-` for descending order.
    pub order: Option<String>,
}

impl ListParams {
    fn to_query(&self, table: &str) -> Result<RowQuery, AppError> {
        let mut query =
            RowQuery::table(table).limit(self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT));

        if let Some(order) = self.order.as_deref() {
            let (column, ascending) = match order.strip_prefix('-') {
                Some(column) => (column, false),
                None => (order, true),
            };
            if column.is_empty() || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(AppError::BadRequest(format!("Invalid order column '{order}'")));
            }
            query = query.order_by(column, ascending);
        }

        Ok(query)
    }
}

async fn list_typed<T: Table>(rows: &dyn RowSource, query: RowQuery) -> Result<Value, AppError> {
    let items: Vec<T> = fetch_typed(rows, query).await?;
    serde_json::to_value(items).map_err(|e| AppError::Internal(e.to_string()))
}

/// List a public table as typed JSON.
///
/// Unpublished news and inactive services are never listed.
pub async fn list_content(
    rows: &dyn RowSource,
    table: &str,
    params: &ListParams,
) -> Result<Value, AppError> {
    let query = params.to_query(table)?;

    match table {
        "actualites" => list_typed::<Actualite>(rows, query.eq("publie", "true")).await,
        "documents" => list_typed::<DocumentOfficiel>(rows, query).await,
        "services" => list_typed::<Service>(rows, query.eq("actif", "true")).await,
        "conseils" => list_typed::<Conseil>(rows, query).await,
        "chiffres_cles" => list_typed::<ChiffreCle>(rows, query).await,
        "entites_cartographie" => list_typed::<EntiteCartographique>(rows, query).await,
        "baremes" => list_typed::<Bareme>(rows, query).await,
        _ => Err(AppError::NotFound(format!("Unknown content table '{table}'"))),
    }
}

/// Fetch a single published news article by id.
pub async fn get_article(rows: &dyn RowSource, id: &str) -> Result<Actualite, AppError> {
    let query = RowQuery::table(Actualite::NAME)
        .eq("id", id)
        .eq("publie", "true")
        .limit(1);
    fetch_typed::<Actualite>(rows, query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("Article '{id}' not found")))
}

/// Fetch a single legal document by id.
pub async fn get_document(rows: &dyn RowSource, id: &str) -> Result<DocumentOfficiel, AppError> {
    let query = RowQuery::table(DocumentOfficiel::NAME).eq("id", id).limit(1);
    fetch_typed::<DocumentOfficiel>(rows, query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("Document '{id}' not found")))
}

/// Fetch a single active service by id.
pub async fn get_service(rows: &dyn RowSource, id: &str) -> Result<Service, AppError> {
    let query = RowQuery::table(Service::NAME)
        .eq("id", id)
        .eq("actif", "true")
        .limit(1);
    fetch_typed::<Service>(rows, query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("Service '{id}' not found")))
}

/// Load the map markers of every cartography entity.
pub async fn load_markers(rows: &dyn RowSource) -> Result<Value, AppError> {
    let entities: Vec<EntiteCartographique> =
        fetch_typed(rows, RowQuery::table(EntiteCartographique::NAME)).await?;
    Ok(crate::map::to_feature_collection(&entities))
}

/// Axum handler for `GET /api/v1/content/{table}`.
#[cfg(feature = "ssr")]
pub async fn list_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Path(table): axum::extract::Path<String>,
    axum::extract::Query(params): axum::extract::Query<ListParams>,
) -> Result<axum::Json<Value>, AppError> {
    let items = list_content(state.rows.as_ref(), &table, &params).await?;
    Ok(axum::Json(items))
}

/// Axum handler for `GET /api/v1/cartographie/markers`.
#[cfg(feature = "ssr")]
pub async fn markers_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> Result<axum::Json<Value>, AppError> {
    Ok(axum::Json(load_markers(state.rows.as_ref()).await?))
}
