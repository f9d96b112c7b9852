use leptos::prelude::*;

use crate::components::article_body::ArticleBody;
use crate::components::locale_switcher::use_locale;

/// Create or update a news article. Returns the article id.
#[server]
pub async fn save_article(
    id: Option<String>,
    titre: String,
    contenu: String,
    token: String,
) -> Result<String, ServerFnError> {
    use crate::api::admin::{check_service_token, process_admin_write, AdminAction};
    use crate::state::AppState;

    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found"))?;

    check_service_token(Some(&format!("Bearer {token}")), &state.service_token)
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let payload = serde_json::json!({ "titre": titre, "contenu": contenu });
    let action = if id.is_some() {
        AdminAction::Update
    } else {
        AdminAction::Create
    };

    let row = process_admin_write(
        state.rows.as_ref(),
        action,
        "actualites",
        id.as_deref(),
        Some(payload),
    )
    .await
    .map_err(|e| ServerFnError::new(e.to_string()))?;

    let saved_id = id.or_else(|| {
        row.as_ref().and_then(|r| r.get("id")).map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    });
    Ok(saved_id.unwrap_or_default())
}

/// Markdown editor with a live preview rendered by the same renderer as
/// public pages.
#[component]
pub fn MarkdownEditor(
    #[prop(optional)] article_id: Option<String>,
    #[prop(optional)] initial_title: String,
    #[prop(optional)] initial_content: String,
) -> impl IntoView {
    let i18n = use_locale();
    let title = RwSignal::new(initial_title);
    let content = RwSignal::new(initial_content);
    let token = RwSignal::new(String::new());
    let article_id = RwSignal::new(article_id);

    let save_action = Action::new(|(id, t, c, k): &(Option<String>, String, String, String)| {
        let (id, t, c, k) = (id.clone(), t.clone(), c.clone(), k.clone());
        async move { save_article(id, t, c, k).await }
    });

    // Subsequent saves update the article created by the first one
    Effect::new(move |_| {
        if let Some(Ok(id)) = save_action.value().get() {
            if !id.is_empty() {
                article_id.set(Some(id));
            }
        }
    });

    view! {
        <div class="editor-container grid gap-4 md:grid-cols-2">
            <div class="editor-input">
                <label>
                    {move || i18n.t("editor", "title")}
                    <input
                        type="text"
                        on:input=move |ev| title.set(event_target_value(&ev))
                        prop:value=title
                    />
                </label>
                <label>
                    {move || i18n.t("editor", "content")}
                    <textarea
                        rows="20"
                        on:input=move |ev| content.set(event_target_value(&ev))
                        prop:value=content
                    ></textarea>
                </label>
                <label>
                    {move || i18n.t("editor", "token")}
                    <input
                        type="password"
                        on:input=move |ev| token.set(event_target_value(&ev))
                        prop:value=token
                    />
                </label>
                <button
                    on:click=move |_| {
                        save_action.dispatch((
                            article_id.get_untracked(),
                            title.get_untracked(),
                            content.get_untracked(),
                            token.get_untracked(),
                        ));
                    }
                    disabled=move || save_action.pending().get()
                >
                    {move || {
                        if save_action.pending().get() {
                            i18n.t("editor", "saving")
                        } else {
                            i18n.t("editor", "save")
                        }
                    }}
                </button>
                {move || save_action.value().get().map(|res| match res {
                    Ok(_) => view! { <p class="success">{i18n.t("editor", "saved")}</p> }.into_any(),
                    Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
                })}
            </div>
            <div class="editor-preview">
                <h2>{move || i18n.t("editor", "preview")}</h2>
                <ArticleBody markdown=content />
            </div>
        </div>
    }
}
