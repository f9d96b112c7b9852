//! Public pages that list backend content: documents, services, tips,
//! the tax scales and the organization page.

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::components::article_body::ArticleBody;
use crate::components::locale_switcher::use_locale;
use crate::db::models::{Bareme, Conseil, DocumentOfficiel, Service};

#[cfg(feature = "ssr")]
async fn list_public<T: serde::de::DeserializeOwned>(
    table: &str,
    order: &str,
) -> Result<Vec<T>, ServerFnError> {
    use crate::api::content::{list_content, ListParams};
    use crate::state::AppState;

    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    let params = ListParams {
        limit: None,
        order: Some(order.to_string()),
    };
    let value = list_content(state.rows.as_ref(), table, &params)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| ServerFnError::new(e.to_string()))
}

#[server]
pub async fn list_documents() -> Result<Vec<DocumentOfficiel>, ServerFnError> {
    list_public("documents", "-date_publication").await
}

#[server]
pub async fn get_document(id: String) -> Result<DocumentOfficiel, ServerFnError> {
    use crate::state::AppState;

    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    crate::api::content::get_document(state.rows.as_ref(), &id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[server]
pub async fn list_services() -> Result<Vec<Service>, ServerFnError> {
    list_public("services", "ordre").await
}

#[server]
pub async fn get_service(id: String) -> Result<Service, ServerFnError> {
    use crate::state::AppState;

    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    crate::api::content::get_service(state.rows.as_ref(), &id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[server]
pub async fn list_conseils() -> Result<Vec<Conseil>, ServerFnError> {
    list_public("conseils", "id").await
}

#[server]
pub async fn list_baremes() -> Result<Vec<Bareme>, ServerFnError> {
    list_public("baremes", "tranche_min").await
}

/// Group scale brackets per tax, keeping the first-seen order of taxes.
pub fn group_by_tax(baremes: Vec<Bareme>) -> Vec<(String, Vec<Bareme>)> {
    let mut groups: Vec<(String, Vec<Bareme>)> = Vec::new();
    for bareme in baremes {
        match groups.iter_mut().find(|(impot, _)| *impot == bareme.impot) {
            Some((_, brackets)) => brackets.push(bareme),
            None => groups.push((bareme.impot.clone(), vec![bareme])),
        }
    }
    groups
}

/// Tax due on `amount` under one tax's brackets: the fixed amount of the
/// matching bracket plus its rate applied to the whole amount.
pub fn estimate(brackets: &[Bareme], amount: f64) -> Option<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    brackets
        .iter()
        .find(|b| amount >= b.tranche_min && b.tranche_max.map_or(true, |max| amount < max))
        .map(|b| b.montant_fixe.unwrap_or(0.0) + amount * b.taux / 100.0)
}

fn bracket_label(bareme: &Bareme) -> String {
    match bareme.tranche_max {
        Some(max) => format!("{} – {}", bareme.tranche_min, max),
        None => format!("≥ {}", bareme.tranche_min),
    }
}

#[component]
fn Empty() -> impl IntoView {
    let i18n = use_locale();
    view! { <p class="empty">{move || i18n.t("pages", "empty")}</p> }
}

#[component]
pub fn AboutPage() -> impl IntoView {
    let i18n = use_locale();
    view! {
        <h1>{move || i18n.t("pages", "about_title")}</h1>
        <p>{move || i18n.t("pages", "about_body")}</p>
    }
}

#[component]
pub fn DocumentsPage() -> impl IntoView {
    let i18n = use_locale();
    let documents = Resource::new(|| (), |_| async move { list_documents().await });

    view! {
        <h1>{move || i18n.t("nav", "documents")}</h1>
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || documents.get().map(|res| match res {
                Ok(items) if items.is_empty() => view! { <Empty/> }.into_any(),
                Ok(items) => view! {
                    <ul class="documents">
                        {items.into_iter().map(|doc| view! {
                            <li>
                                <a href=format!("/documents/{}", doc.id)>{doc.titre}</a>
                                {doc.categorie.map(|c| view! { <span class="category">{c}</span> })}
                            </li>
                        }).collect_view()}
                    </ul>
                }.into_any(),
                Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
pub fn DocumentPage() -> impl IntoView {
    let i18n = use_locale();
    let params = use_params_map();
    let id = Memo::new(move |_| params.get().get("id").unwrap_or_default());
    let document = Resource::new(move || id.get(), |id| async move { get_document(id).await });

    view! {
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || document.get().map(|res| match res {
                Ok(doc) => view! {
                    <article class="document">
                        <h1>{doc.titre}</h1>
                        {doc.date_publication.map(|date| view! { <time>{date.to_string()}</time> })}
                        {doc.description.map(|d| view! { <p>{d}</p> })}
                        {doc
                            .fichier_url
                            .filter(|url| crate::rendering::links::is_safe_url(url))
                            .map(|url| view! {
                                <a class="download" href=url>{i18n.t("pages", "download")}</a>
                            })}
                        <a href="/documents">{i18n.t("common", "back")}</a>
                    </article>
                }.into_any(),
                Err(_) => view! { <p class="not-found">{i18n.t("common", "not_found")}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
pub fn ServicesPage() -> impl IntoView {
    let i18n = use_locale();
    let services = Resource::new(|| (), |_| async move { list_services().await });

    view! {
        <h1>{move || i18n.t("nav", "services")}</h1>
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || services.get().map(|res| match res {
                Ok(items) if items.is_empty() => view! { <Empty/> }.into_any(),
                Ok(items) => view! {
                    <div class="services">
                        {items.into_iter().map(|service| view! {
                            <article class="service-card">
                                <h3><a href=format!("/services/{}", service.id)>{service.nom}</a></h3>
                                {service.description.map(|d| view! { <p>{d}</p> })}
                            </article>
                        }).collect_view()}
                    </div>
                }.into_any(),
                Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
pub fn ServicePage() -> impl IntoView {
    let i18n = use_locale();
    let params = use_params_map();
    let id = Memo::new(move |_| params.get().get("id").unwrap_or_default());
    let service = Resource::new(move || id.get(), |id| async move { get_service(id).await });

    view! {
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || service.get().map(|res| match res {
                Ok(service) => view! {
                    <article class="service">
                        <h1>{service.nom}</h1>
                        {service.description.map(|d| view! { <p>{d}</p> })}
                        <a href="/services">{i18n.t("common", "back")}</a>
                    </article>
                }.into_any(),
                Err(_) => view! { <p class="not-found">{i18n.t("common", "not_found")}</p> }.into_any(),
            })}
        </Suspense>
    }
}

/// Tips are listed on one page; each one is reachable through its
/// `conseil-{id}` anchor.
#[component]
pub fn TipsPage() -> impl IntoView {
    let i18n = use_locale();
    let tips = Resource::new(|| (), |_| async move { list_conseils().await });

    view! {
        <h1>{move || i18n.t("pages", "tips")}</h1>
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || tips.get().map(|res| match res {
                Ok(items) if items.is_empty() => view! { <Empty/> }.into_any(),
                Ok(items) => items
                    .into_iter()
                    .map(|tip| view! {
                        <section class="tip" id=format!("conseil-{}", tip.id)>
                            <h2>{tip.titre}</h2>
                            <ArticleBody markdown=tip.contenu />
                        </section>
                    })
                    .collect_view()
                    .into_any(),
                Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
pub fn SimulatorPage() -> impl IntoView {
    let i18n = use_locale();
    let baremes = Resource::new(|| (), |_| async move { list_baremes().await });
    let amount = RwSignal::new(None::<f64>);

    view! {
        <h1>{move || i18n.t("nav", "simulator")}</h1>
        <p>{move || i18n.t("pages", "simulator_intro")}</p>
        <label>
            {move || i18n.t("pages", "amount")}
            <input
                type="number"
                min="0"
                on:input=move |ev| amount.set(event_target_value(&ev).trim().parse().ok())
            />
        </label>
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || baremes.get().map(|res| match res {
                Ok(items) if items.is_empty() => view! { <Empty/> }.into_any(),
                Ok(items) => group_by_tax(items)
                    .into_iter()
                    .map(|(impot, brackets)| {
                        let scale = brackets.clone();
                        let due = move || {
                            amount
                                .get()
                                .and_then(|value| estimate(&scale, value))
                                .map(|due| format!("{}: {due:.2}", i18n.t("pages", "estimate")))
                        };
                        view! {
                            <table class="bareme">
                                <caption>{impot} " " <span class="estimate">{due}</span></caption>
                                <thead>
                                    <tr>
                                        <th>{i18n.t("pages", "bracket")}</th>
                                        <th>{i18n.t("pages", "rate")}</th>
                                        <th>{i18n.t("pages", "fixed_amount")}</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {brackets.into_iter().map(|b| view! {
                                        <tr>
                                            <td>{bracket_label(&b)}</td>
                                            <td>{format!("{} %", b.taux)}</td>
                                            <td>{b.montant_fixe.map(|m| m.to_string()).unwrap_or_default()}</td>
                                        </tr>
                                    }).collect_view()}
                                </tbody>
                            </table>
                        }
                    })
                    .collect_view()
                    .into_any(),
                Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}
