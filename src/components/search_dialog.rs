use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::locale_switcher::use_locale;
use crate::search::catalog::SearchableRecord;
use crate::search::session::SearchSession;

#[server]
pub async fn load_search_catalog() -> Result<Vec<SearchableRecord>, ServerFnError> {
    use crate::state::AppState;
    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;

    Ok(crate::search::catalog::load_catalog(state.rows.as_ref()).await)
}

#[component]
pub fn SearchDialog() -> impl IntoView {
    let i18n = use_locale();
    let session = Arc::new(SearchSession::default());
    let open = RwSignal::new(false);
    let loading = RwSignal::new(false);
    let query = RwSignal::new(String::new());
    // Bumped whenever a refresh installs new records
    let generation = RwSignal::new(0u64);

    let refresh = {
        let session = Arc::clone(&session);
        move || {
            let session = Arc::clone(&session);
            let ticket = session.begin_refresh();
            loading.set(true);
            spawn_local(async move {
                match load_search_catalog().await {
                    Ok(records) => {
                        if session.complete_refresh(ticket, records) {
                            generation.update(|g| *g += 1);
                            loading.set(false);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load search catalog: {e}");
                        // A newer refresh still owns the spinner
                        if session.is_current(ticket) {
                            loading.set(false);
                        }
                    }
                }
            });
        }
    };

    let results = {
        let session = Arc::clone(&session);
        Memo::new(move |_| {
            generation.track();
            session.search(&query.get())
        })
    };

    let open_dialog = move |_| {
        open.set(true);
        refresh();
    };
    let close_dialog = move |_| {
        open.set(false);
        query.set(String::new());
    };

    view! {
        <button class="search-trigger" on:click=open_dialog>
            {move || i18n.t("search", "open")}
        </button>
        <Show when=move || open.get()>
            <div class="search-dialog" role="dialog">
                <div class="search-header">
                    <input
                        type="search"
                        placeholder=move || i18n.t("search", "placeholder")
                        on:input=move |ev| query.set(event_target_value(&ev))
                        prop:value=query
                    />
                    <button on:click=close_dialog>{move || i18n.t("search", "close")}</button>
                </div>
                <div class="search-results">
                    {move || {
                        let hits = results.get();
                        if query.get().trim().is_empty() {
                            None
                        } else if hits.is_empty() && loading.get() {
                            Some(view! { <p>{i18n.t("search", "loading")}</p> }.into_any())
                        } else if hits.is_empty() {
                            Some(view! { <p>{i18n.t("search", "no_results")}</p> }.into_any())
                        } else {
                            Some(view! {
                                <ul>
                                    {hits.into_iter().map(|hit| view! {
                                        <SearchHit record=hit />
                                    }).collect_view()}
                                </ul>
                            }.into_any())
                        }
                    }}
                </div>
            </div>
        </Show>
    }
}

#[component]
fn SearchHit(record: SearchableRecord) -> impl IntoView {
    let i18n = use_locale();
    let source = record.source_type.to_string();

    view! {
        <li class="search-hit">
            <a href=record.url>
                <span class="search-source">{move || i18n.t("sources", &source)}</span>
                <strong>{record.title}</strong>
                <p>{record.description}</p>
            </a>
        </li>
    }
}
