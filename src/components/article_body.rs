use leptos::prelude::*;

use crate::db::models::Actualite;
use crate::rendering::markdown::render_markdown;

#[server]
pub async fn get_article(id: String) -> Result<Actualite, ServerFnError> {
    use crate::state::AppState;
    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;

    crate::api::content::get_article(state.rows.as_ref(), &id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// Markdown body rendered to HTML. The renderer escapes all input, so its
/// output is safe for `inner_html`.
#[component]
pub fn ArticleBody(#[prop(into)] markdown: Signal<String>) -> impl IntoView {
    let html = Memo::new(move |_| render_markdown(&markdown.get()));

    view! { <div class="article-body prose" inner_html=move || html.get()></div> }
}
