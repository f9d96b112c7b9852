use leptos::prelude::*;
use leptos_meta::{provide_meta_context, MetaTags, Stylesheet, Title};
use leptos_router::components::*;
use leptos_router::hooks::use_params_map;
use leptos_router::path;
use serde::{Deserialize, Serialize};

use crate::components::article_body::{get_article, ArticleBody};
use crate::components::contact_form::ContactPage;
use crate::components::locale_switcher::{provide_locale, use_locale, LocaleSwitcher};
use crate::components::map_view::MapPage;
use crate::components::markdown_editor::MarkdownEditor;
use crate::components::public_pages::{
    AboutPage, DocumentPage, DocumentsPage, ServicePage, ServicesPage, SimulatorPage, TipsPage,
};
use crate::components::search_dialog::SearchDialog;
use crate::db::models::{Actualite, ChiffreCle};
use crate::i18n::Locale;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeData {
    pub key_figures: Vec<ChiffreCle>,
    pub latest_news: Vec<Actualite>,
}

#[server]
pub async fn get_home_data() -> Result<HomeData, ServerFnError> {
    use crate::db::rows::{fetch_typed, RowQuery};
    use crate::state::AppState;

    // News items shown on the home page
    const HOME_NEWS: usize = 3;

    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    let rows = state.rows.as_ref();

    let figures_query = RowQuery::table("chiffres_cles").order_by("ordre", true);
    let news_query = RowQuery::table("actualites")
        .eq("publie", "true")
        .order_by("date_publication", false)
        .limit(HOME_NEWS);

    let (key_figures, latest_news) = futures::join!(
        fetch_typed::<ChiffreCle>(rows, figures_query),
        fetch_typed::<Actualite>(rows, news_query),
    );

    Ok(HomeData {
        key_figures: key_figures.map_err(|e| ServerFnError::new(e.to_string()))?,
        latest_news: latest_news.map_err(|e| ServerFnError::new(e.to_string()))?,
    })
}

#[server]
pub async fn list_news() -> Result<Vec<Actualite>, ServerFnError> {
    use crate::api::content::{list_content, ListParams};
    use crate::state::AppState;

    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    let params = ListParams {
        limit: None,
        order: Some("-date_publication".into()),
    };
    let value = list_content(state.rows.as_ref(), "actualites", &params)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| ServerFnError::new(e.to_string()))
}

/// HTML document wrapping the app during server rendering.
pub fn shell(options: LeptosOptions, lang: Locale) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang=lang.code()>
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    let i18n = provide_locale();

    view! {
        <Stylesheet id="leptos" href="/pkg/drnoflu.css"/>
        <Title text="DRNOFLU - Direction des Recettes du Nord-Ubangi"/>

        <Router>
            <nav class="top-nav">
                <a class="logo" href="/">"DRNOFLU"</a>
                <a href="/">{move || i18n.t("nav", "home")}</a>
                <a href="/a-propos">{move || i18n.t("nav", "about")}</a>
                <a href="/actualites">{move || i18n.t("nav", "news")}</a>
                <a href="/documents">{move || i18n.t("nav", "documents")}</a>
                <a href="/services">{move || i18n.t("nav", "services")}</a>
                <a href="/conseils">{move || i18n.t("nav", "tips")}</a>
                <a href="/cartographie">{move || i18n.t("nav", "map")}</a>
                <a href="/simulateur">{move || i18n.t("nav", "simulator")}</a>
                <a href="/contact">{move || i18n.t("nav", "contact")}</a>
                <SearchDialog />
                <LocaleSwitcher />
            </nav>
            <main>
                <Routes fallback=|| view! { <NotFound/> }.into_view()>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/actualites") view=NewsPage/>
                    <Route path=path!("/actualites/:id") view=ArticlePage/>
                    <Route path=path!("/a-propos") view=AboutPage/>
                    <Route path=path!("/documents") view=DocumentsPage/>
                    <Route path=path!("/documents/:id") view=DocumentPage/>
                    <Route path=path!("/services") view=ServicesPage/>
                    <Route path=path!("/services/:id") view=ServicePage/>
                    <Route path=path!("/conseils") view=TipsPage/>
                    <Route path=path!("/cartographie") view=MapPage/>
                    <Route path=path!("/simulateur") view=SimulatorPage/>
                    <Route path=path!("/contact") view=ContactPage/>
                    <Route path=path!("/admin/editeur") view=EditorPage/>
                </Routes>
            </main>
            <footer>{move || i18n.t("footer", "rights")}</footer>
        </Router>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let i18n = use_locale();
    let data = Resource::new(|| (), |_| async move { get_home_data().await });

    view! {
        <section class="hero">
            <h1>{move || i18n.t("home", "hero_title")}</h1>
            <p>{move || i18n.t("home", "hero_subtitle")}</p>
        </section>
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || data.get().map(|res| match res {
                Ok(data) => view! {
                    <section class="key-figures">
                        <h2>{i18n.t("home", "key_figures")}</h2>
                        <ul>
                            {data.key_figures.into_iter().map(|figure| view! {
                                <li>
                                    <strong>{format!("{} {}", figure.valeur, figure.unite.unwrap_or_default()).trim_end().to_string()}</strong>
                                    <span>{figure.libelle}</span>
                                </li>
                            }).collect_view()}
                        </ul>
                    </section>
                    <section class="latest-news">
                        <h2>{i18n.t("home", "latest_news")}</h2>
                        {data.latest_news.into_iter().map(|news| view! { <NewsCard news/> }).collect_view()}
                    </section>
                }.into_any(),
                Err(e) => view! { <p class="error">{i18n.t("common", "error")} ": " {e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
fn NewsCard(news: Actualite) -> impl IntoView {
    let i18n = use_locale();
    let summary = news
        .resume
        .clone()
        .unwrap_or_else(|| crate::rendering::markdown::plain_text(&news.contenu, 200));
    let href = format!("/actualites/{}", news.id);

    view! {
        <article class="news-card">
            <h3><a href=href.clone()>{news.titre}</a></h3>
            <p>{summary}</p>
            <a href=href>{move || i18n.t("common", "read_more")}</a>
        </article>
    }
}

#[component]
fn NewsPage() -> impl IntoView {
    let i18n = use_locale();
    let news = Resource::new(|| (), |_| async move { list_news().await });

    view! {
        <h1>{move || i18n.t("nav", "news")}</h1>
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || news.get().map(|res| match res {
                Ok(items) => items
                    .into_iter()
                    .map(|news| view! { <NewsCard news/> })
                    .collect_view()
                    .into_any(),
                Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
fn ArticlePage() -> impl IntoView {
    let i18n = use_locale();
    let params = use_params_map();
    let id = Memo::new(move |_| params.get().get("id").unwrap_or_default());
    let article = Resource::new(move || id.get(), |id| async move { get_article(id).await });

    view! {
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || article.get().map(|res| match res {
                Ok(article) => view! {
                    <article>
                        <h1>{article.titre}</h1>
                        <ArticleBody markdown=article.contenu />
                        <a href="/actualites">{i18n.t("common", "back")}</a>
                    </article>
                }.into_any(),
                Err(_) => view! { <NotFound/> }.into_any(),
            })}
        </Suspense>
    }
}

#[component]
fn EditorPage() -> impl IntoView {
    let i18n = use_locale();

    view! {
        <h1>{move || i18n.t("editor", "title")}</h1>
        <MarkdownEditor />
    }
}

#[component]
fn NotFound() -> impl IntoView {
    let i18n = use_locale();
    view! { <p class="not-found">{move || i18n.t("common", "not_found")}</p> }
}
