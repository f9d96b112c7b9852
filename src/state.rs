use std::sync::Arc;

use crate::db::rows::RowSource;
use crate::search::matcher::AggregationPolicy;

/// Shared state handed to axum handlers and Leptos server functions.
#[derive(Clone)]
pub struct AppState {
    pub rows: Arc<dyn RowSource>,
    /// Bearer token required by `/api/v1/admin/*`.
    pub service_token: String,
    pub search_cap: usize,
    pub search_policy: AggregationPolicy,
    pub leptos_options: leptos::prelude::LeptosOptions,
}

impl axum::extract::FromRef<AppState> for leptos::prelude::LeptosOptions {
    fn from_ref(state: &AppState) -> Self {
        state.leptos_options.clone()
    }
}
