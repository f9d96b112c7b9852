#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::Context;
    use drnoflu::config::Settings;
    use drnoflu::db::memory::MemoryRowSource;
    use drnoflu::db::rows::RowSource;
    use drnoflu::db::supabase::SupabaseRowSource;
    use drnoflu::state::AppState;
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use tower_http::services::ServeDir;
    use tower_http::trace::TraceLayer;

    let settings = Settings::load().context("Failed to load settings")?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.log_filter.as_str().into()),
        )
        .init();

    tracing::info!("Starting DRNOFLU portal...");

    // Load Leptos options from Cargo.toml metadata
    let conf = get_configuration(None).context("Failed to read Leptos configuration")?;
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;
    let site_root = leptos_options.site_root.to_string();

    let rows: Arc<dyn RowSource> = if settings.is_demo() {
        tracing::warn!("No Supabase project configured, serving demo data");
        let memory = MemoryRowSource::new();
        drnoflu::demo_seeder::seed_demo_data(&memory);
        Arc::new(memory)
    } else {
        let url = settings.supabase_url.as_deref().unwrap_or_default();
        let key = settings
            .supabase_anon_key
            .as_deref()
            .context("DRNOFLU__SUPABASE_ANON_KEY is required with DRNOFLU__SUPABASE_URL")?;
        let source = SupabaseRowSource::new(
            url,
            key,
            Duration::from_secs(settings.http_timeout_secs),
        )?;
        tracing::info!("Using Supabase backend at {}", url);
        Arc::new(source)
    };

    if settings.service_token == "dev-token" {
        tracing::warn!("Admin API is using the default service token");
    }

    // Build application state
    let app_state = AppState {
        rows,
        service_token: settings.service_token.clone(),
        search_cap: settings.search.result_cap,
        search_policy: settings.search.policy,
        leptos_options: leptos_options.clone(),
    };

    // Generate the Leptos route list for SSR
    let routes = generate_route_list(drnoflu::app::App);
    let lang = settings.locale();

    // Build the Axum router
    let app = drnoflu::api::router()
        .leptos_routes_with_context(
            &app_state,
            routes,
            {
                let app_state = app_state.clone();
                move || provide_context(app_state.clone())
            },
            {
                let leptos_options = leptos_options.clone();
                move || drnoflu::app::shell(leptos_options.clone(), lang)
            },
        )
        // Static files (compiled WASM, CSS and public assets)
        .fallback_service(ServeDir::new(&site_root))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start the server
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;

    Ok(())
}

// When compiled for WASM (client-side), there's no main function.
// The hydrate() function in lib.rs handles client-side initialization.
#[cfg(not(feature = "ssr"))]
fn main() {}
