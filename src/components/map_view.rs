use leptos::prelude::*;
use serde_json::Value;

use crate::components::locale_switcher::use_locale;

/// GeoJSON markers, the same collection `GET /api/v1/cartographie/markers`
/// serves.
#[server]
pub async fn get_map_markers() -> Result<Value, ServerFnError> {
    use crate::state::AppState;

    let state = leptos::prelude::use_context::<AppState>()
        .ok_or_else(|| ServerFnError::new("AppState not found in context"))?;
    crate::api::content::load_markers(state.rows.as_ref())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

/// One line of the office list under the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    pub id: String,
    pub nom: String,
    pub type_entite: String,
    pub adresse: Option<String>,
    pub telephone: Option<String>,
}

/// Flatten the features of a marker collection.
pub fn marker_entries(collection: &Value) -> Vec<MarkerEntry> {
    let text = |value: &Value| value.as_str().map(str::to_string);

    collection["features"]
        .as_array()
        .map(|features| {
            features
                .iter()
                .map(|feature| {
                    let props = &feature["properties"];
                    MarkerEntry {
                        id: text(&feature["id"]).unwrap_or_default(),
                        nom: text(&props["nom"]).unwrap_or_default(),
                        type_entite: text(&props["type_entite"]).unwrap_or_default(),
                        adresse: text(&props["adresse"]),
                        telephone: text(&props["telephone"]),
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

#[component]
pub fn MapPage() -> impl IntoView {
    let i18n = use_locale();
    let markers = Resource::new(|| (), |_| async move { get_map_markers().await });

    view! {
        <h1>{move || i18n.t("nav", "map")}</h1>
        <p>{move || i18n.t("pages", "map_intro")}</p>
        <Suspense fallback=move || view! { <p>{i18n.t("common", "loading")}</p> }>
            {move || markers.get().map(|res| match res {
                Ok(collection) => {
                    let entries = marker_entries(&collection);
                    view! {
                        // The map widget reads its markers from this attribute
                        <div id="carte" class="map" data-geojson=collection.to_string()></div>
                        <ul class="offices">
                            {entries.into_iter().map(|entry| view! {
                                <li id=format!("entite-{}", entry.id)>
                                    <strong>{entry.nom}</strong>
                                    <span class="kind">{entry.type_entite}</span>
                                    {entry.adresse.map(|a| view! { <span>{a}</span> })}
                                    {entry.telephone.map(|t| view! {
                                        <a href=format!("tel:{t}")>{t.clone()}</a>
                                    })}
                                </li>
                            }).collect_view()}
                        </ul>
                    }.into_any()
                }
                Err(e) => view! { <p class="error">{e.to_string()}</p> }.into_any(),
            })}
        </Suspense>
    }
}
