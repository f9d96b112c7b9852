use std::sync::Arc;

use axum::Router;

use drnoflu::db::memory::MemoryRowSource;
use drnoflu::demo_seeder::seed_demo_data;
use drnoflu::search::matcher::AggregationPolicy;
use drnoflu::state::AppState;

pub const TEST_TOKEN: &str = "test-token";

/// In-memory backend plus the API router for integration tests.
pub struct TestEnv {
    pub rows: Arc<MemoryRowSource>,
    pub router: Router,
}

impl TestEnv {
    /// Build an environment over the demo data set.
    pub fn start() -> Self {
        let rows = MemoryRowSource::new();
        seed_demo_data(&rows);
        Self::with_rows(rows, AggregationPolicy::SourceOrder)
    }

    /// Build an environment over caller-provided rows.
    pub fn with_rows(rows: MemoryRowSource, policy: AggregationPolicy) -> Self {
        let rows = Arc::new(rows);
        let leptos_options = leptos::prelude::LeptosOptions::builder()
            .output_name("drnoflu")
            .build();

        let app_state = AppState {
            rows: rows.clone(),
            service_token: TEST_TOKEN.to_string(),
            search_cap: 20,
            search_policy: policy,
            leptos_options,
        };

        // API routes only, no Leptos SSR
        let router = drnoflu::api::router().with_state(app_state);

        Self { rows, router }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }
}
