use serde::Deserialize;

use crate::db::rows::RowSource;
use crate::search::catalog::{load_catalog, SearchableRecord};
use crate::search::matcher::{search_with_policy, AggregationPolicy};

/// Upper bound for a caller-supplied `cap`.
pub const MAX_RESULT_CAP: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub cap: Option<usize>,
}

/// Build a fresh catalog and run the matcher over it.
pub async fn run_search(
    rows: &dyn RowSource,
    params: &SearchParams,
    default_cap: usize,
    policy: AggregationPolicy,
) -> Vec<SearchableRecord> {
    if params.q.trim().is_empty() {
        return Vec::new();
    }
    let cap = params.cap.unwrap_or(default_cap).min(MAX_RESULT_CAP);
    let catalog = load_catalog(rows).await;
    search_with_policy(&catalog, &params.q, cap, policy)
}

/// Axum handler for `GET /api/v1/search/catalog`.
#[cfg(feature = "ssr")]
pub async fn catalog_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> axum::Json<Vec<SearchableRecord>> {
    axum::Json(load_catalog(state.rows.as_ref()).await)
}

/// Axum handler for `GET /api/v1/search?q=...&cap=...`.
#[cfg(feature = "ssr")]
pub async fn search_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::extract::Query(params): axum::extract::Query<SearchParams>,
) -> axum::Json<Vec<SearchableRecord>> {
    let hits = run_search(
        state.rows.as_ref(),
        &params,
        state.search_cap,
        state.search_policy,
    )
    .await;
    axum::Json(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::rows::MockRowSource;
    use serde_json::json;

    fn source_with_news(count: usize) -> MockRowSource {
        let mut source = MockRowSource::new();
        source.expect_fetch_rows().returning(move |query| {
            Ok(match query.table_name() {
                "actualites" => (0..count)
                    .map(|n| json!({"id": n, "titre": format!("Recouvrement {n}")}))
                    .collect(),
                _ => vec![],
            })
        });
        source
    }

    #[tokio::test]
    async fn test_empty_query_skips_backend() {
        let mut source = MockRowSource::new();
        source.expect_fetch_rows().never();
        let params = SearchParams::default();
        let hits = run_search(&source, &params, 20, AggregationPolicy::SourceOrder).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_cap_is_clamped() {
        let source = source_with_news(150);
        let params = SearchParams {
            q: "recouvrement".into(),
            cap: Some(1_000),
        };
        let hits = run_search(&source, &params, 20, AggregationPolicy::SourceOrder).await;
        assert_eq!(hits.len(), MAX_RESULT_CAP.min(150));
    }

    #[tokio::test]
    async fn test_default_cap() {
        let source = source_with_news(30);
        let params = SearchParams {
            q: "recouvrement".into(),
            cap: None,
        };
        let hits = run_search(&source, &params, 20, AggregationPolicy::SourceOrder).await;
        assert_eq!(hits.len(), 20);
        assert_eq!(hits[0].id, "news-0");
    }
}
