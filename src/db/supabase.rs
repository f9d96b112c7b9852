use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::db::rows::{Row, RowQuery, RowSource};
use crate::error::AppError;

/// `RowSource` backed by the Supabase REST (PostgREST) endpoint.
pub struct SupabaseRowSource {
    client: Client,
    rest_url: String,
    api_key: String,
}

impl SupabaseRowSource {
    /// Create a client for the project at `project_url` (e.g. `https://xyz.supabase.co`).
    pub fn new(project_url: &str, api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder, table: &str) -> Result<Response, AppError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Request to '{table}' failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::Backend(format!(
            "'{table}' responded with {status}: {body}"
        )))
    }

    async fn single_row(response: Response, table: &str) -> Result<Row, AppError> {
        let rows: Vec<Row> = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Invalid response from '{table}': {e}")))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("no row returned by '{table}'")))
    }
}

#[async_trait]
impl RowSource for SupabaseRowSource {
    async fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<Row>, AppError> {
        let table = query.table_name();
        let pairs = query.to_query_pairs();
        tracing::debug!(table, ?pairs, "Fetching rows");

        let request = self.client.get(self.table_url(table)).query(&pairs);
        let response = self.send(request, table).await?;

        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| AppError::Backend(format!("Invalid response from '{table}': {e}")))
    }

    async fn insert_row(&self, table: &str, row: Row) -> Result<Row, AppError> {
        if !row.is_object() {
            return Err(AppError::BadRequest("row must be a JSON object".into()));
        }

        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row);
        let response = self.send(request, table).await?;
        Self::single_row(response, table).await
    }

    async fn update_row(&self, table: &str, id: &str, patch: Row) -> Result<Row, AppError> {
        let Value::Object(mut fields) = patch else {
            return Err(AppError::BadRequest("patch must be a JSON object".into()));
        };
        fields.remove("id");

        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&Value::Object(fields));
        let response = self.send(request, table).await?;
        Self::single_row(response, table)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound(format!("{table}/{id}")),
                other => other,
            })
    }

    async fn delete_row(&self, table: &str, id: &str) -> Result<(), AppError> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation");
        let response = self.send(request, table).await?;
        Self::single_row(response, table)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound(format!("{table}/{id}")),
                other => other,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_url_normalization() {
        let source =
            SupabaseRowSource::new("https://demo.supabase.co/", "anon", Duration::from_secs(5))
                .unwrap();
        assert_eq!(source.table_url("actualites"), "https://demo.supabase.co/rest/v1/actualites");
    }
}
