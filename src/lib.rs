pub mod app;
pub mod error;
pub mod map;
pub mod demo_seeder;
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod state;
pub mod i18n;
pub mod rendering {
    pub mod links;
    pub mod markdown;
}
pub mod search {
    pub mod catalog;
    pub mod matcher;
    pub mod normalize;
    pub mod session;
}
pub mod db {
    pub mod memory;
    pub mod models;
    pub mod rows;
    #[cfg(feature = "ssr")]
    pub mod supabase;
}
pub mod components {
    pub mod article_body;
    pub mod contact_form;
    pub mod locale_switcher;
    pub mod map_view;
    pub mod markdown_editor;
    pub mod public_pages;
    pub mod search_dialog;
}
pub mod api {
    pub mod admin;
    pub mod contact;
    pub mod content;
    pub mod errors;
    pub mod render;
    pub mod search;

    /// Routes of the public REST API, without the Leptos pages.
    #[cfg(feature = "ssr")]
    pub fn router() -> axum::Router<crate::state::AppState> {
        use axum::routing::{get, post, put};

        axum::Router::new()
            .route("/api/v1/search", get(search::search_handler))
            .route("/api/v1/search/catalog", get(search::catalog_handler))
            .route("/api/v1/render", post(render::render_handler))
            .route("/api/v1/content/{table}", get(content::list_handler))
            .route("/api/v1/cartographie/markers", get(content::markers_handler))
            .route("/api/v1/messages", post(contact::contact_handler))
            .route("/api/v1/admin/{table}", post(admin::create_handler))
            .route(
                "/api/v1/admin/{table}/{id}",
                put(admin::update_handler).delete(admin::delete_handler),
            )
    }
}

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(app::App);
}
