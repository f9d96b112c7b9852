use std::fmt;

use serde::{Deserialize, Serialize};

use crate::db::models::{Actualite, Conseil, DocumentOfficiel, Service};
use crate::db::rows::{fetch_typed, RowQuery, RowSource, Table};
use crate::rendering::markdown::plain_text;

/// Length of descriptions derived from markdown bodies.
const DESCRIPTION_CHARS: usize = 200;

/// Rows fetched per backend source when building the catalog.
const ROWS_PER_SOURCE: usize = 100;

/// Where a searchable record comes from. Declaration order is catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Page,
    News,
    Document,
    Service,
    Tip,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Page => write!(f, "page"),
            SourceType::News => write!(f, "news"),
            SourceType::Document => write!(f, "document"),
            SourceType::Service => write!(f, "service"),
            SourceType::Tip => write!(f, "tip"),
        }
    }
}

/// One entry of the search catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchableRecord {
    /// Unique across sources: `<source>-<row id>`.
    pub id: String,
    pub title: String,
    pub description: String,
    pub source_type: SourceType,
    /// Where selecting the result navigates to.
    pub url: String,
}

/// Conversion of a typed row into a search record.
pub trait Searchable: Table {
    const SOURCE: SourceType;

    fn to_search_record(&self) -> SearchableRecord;

    /// Query used to load this source's candidates.
    fn catalog_query() -> RowQuery {
        RowQuery::table(Self::NAME).limit(ROWS_PER_SOURCE)
    }
}

fn record(
    source_type: SourceType,
    row_id: impl fmt::Display,
    title: &str,
    description: String,
    url: String,
) -> SearchableRecord {
    SearchableRecord {
        id: format!("{source_type}-{row_id}"),
        title: title.to_string(),
        description,
        source_type,
        url,
    }
}

impl Searchable for Actualite {
    const SOURCE: SourceType = SourceType::News;

    fn to_search_record(&self) -> SearchableRecord {
        let description = match self.resume.as_deref().map(str::trim) {
            Some(resume) if !resume.is_empty() => resume.to_string(),
            _ => plain_text(&self.contenu, DESCRIPTION_CHARS),
        };
        record(
            Self::SOURCE,
            &self.id,
            &self.titre,
            description,
            format!("/actualites/{}", self.id),
        )
    }

    fn catalog_query() -> RowQuery {
        RowQuery::table(Self::NAME)
            .eq("publie", "true")
            .order_by("date_publication", false)
            .limit(ROWS_PER_SOURCE)
    }
}

impl Searchable for DocumentOfficiel {
    const SOURCE: SourceType = SourceType::Document;

    fn to_search_record(&self) -> SearchableRecord {
        record(
            Self::SOURCE,
            &self.id,
            &self.titre,
            self.description.clone().unwrap_or_default(),
            format!("/documents/{}", self.id),
        )
    }

    fn catalog_query() -> RowQuery {
        RowQuery::table(Self::NAME)
            .order_by("date_publication", false)
            .limit(ROWS_PER_SOURCE)
    }
}

impl Searchable for Service {
    const SOURCE: SourceType = SourceType::Service;

    fn to_search_record(&self) -> SearchableRecord {
        record(
            Self::SOURCE,
            &self.id,
            &self.nom,
            self.description.clone().unwrap_or_default(),
            format!("/services/{}", self.id),
        )
    }

    fn catalog_query() -> RowQuery {
        RowQuery::table(Self::NAME)
            .eq("actif", "true")
            .order_by("ordre", true)
            .limit(ROWS_PER_SOURCE)
    }
}

impl Searchable for Conseil {
    const SOURCE: SourceType = SourceType::Tip;

    fn to_search_record(&self) -> SearchableRecord {
        record(
            Self::SOURCE,
            &self.id,
            &self.titre,
            plain_text(&self.contenu, DESCRIPTION_CHARS),
            format!("/conseils#conseil-{}", self.id),
        )
    }
}

/// Static pages of the public site: (slug, title, description, url).
const STATIC_PAGES: &[(&str, &str, &str, &str)] = &[
    ("accueil", "Accueil", "Page d'accueil de la DRNOFLU", "/"),
    (
        "a-propos",
        "À propos",
        "Mission, vision et organisation de la Direction des recettes",
        "/a-propos",
    ),
    (
        "actualites",
        "Actualités",
        "Communiqués et nouvelles de la Direction",
        "/actualites",
    ),
    (
        "documents",
        "Documents officiels",
        "Textes légaux, arrêtés, décrets et formulaires",
        "/documents",
    ),
    (
        "services",
        "Services",
        "Services offerts aux contribuables",
        "/services",
    ),
    (
        "cartographie",
        "Cartographie",
        "Carte des bureaux et antennes de perception",
        "/cartographie",
    ),
    (
        "simulateur",
        "Simulateur fiscal",
        "Estimez vos impôts et taxes provinciaux à partir des barèmes",
        "/simulateur",
    ),
    (
        "contact",
        "Contact",
        "Écrivez-nous ou trouvez nos coordonnées",
        "/contact",
    ),
];

/// Records describing the static pages, always first in the catalog.
pub fn static_pages() -> Vec<SearchableRecord> {
    STATIC_PAGES
        .iter()
        .map(|(slug, title, description, url)| SearchableRecord {
            id: format!("{}-{slug}", SourceType::Page),
            title: title.to_string(),
            description: description.to_string(),
            source_type: SourceType::Page,
            url: url.to_string(),
        })
        .collect()
}

/// Load one backend source. A failing fetch yields an empty list.
pub async fn load_source<T: Searchable>(source: &dyn RowSource) -> Vec<SearchableRecord> {
    match fetch_typed::<T>(source, T::catalog_query()).await {
        Ok(rows) => rows.iter().map(T::to_search_record).collect(),
        Err(e) => {
            tracing::warn!(table = T::NAME, "Search source unavailable: {e}");
            Vec::new()
        }
    }
}

/// Build the full catalog: static pages, then news, documents, services and tips.
///
/// Backend sources are fetched concurrently; the result keeps source order.
pub async fn load_catalog(source: &dyn RowSource) -> Vec<SearchableRecord> {
    let (news, documents, services, tips) = futures::join!(
        load_source::<Actualite>(source),
        load_source::<DocumentOfficiel>(source),
        load_source::<Service>(source),
        load_source::<Conseil>(source),
    );

    let mut records = static_pages();
    records.extend(news);
    records.extend(documents);
    records.extend(services);
    records.extend(tips);

    tracing::debug!(count = records.len(), "Search catalog loaded");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::rows::MockRowSource;
    use crate::error::AppError;
    use serde_json::json;

    fn mock_source(fail_table: Option<&'static str>) -> MockRowSource {
        let mut source = MockRowSource::new();
        source.expect_fetch_rows().returning(move |query| {
            let table = query.table_name();
            if Some(table) == fail_table {
                return Err(AppError::Backend("timeout".into()));
            }
            Ok(match table {
                "actualites" => vec![json!({
                    "id": 5,
                    "titre": "Ouverture du guichet unique",
                    "contenu": "Le **guichet unique** ouvre ses portes."
                })],
                "documents" => vec![json!({
                    "id": "b1",
                    "titre": "Édit portant nomenclature",
                    "description": "Nomenclature des taxes provinciales"
                })],
                "services" => vec![json!({"id": 2, "nom": "Vignette", "description": null})],
                "conseils" => vec![json!({
                    "id": 9,
                    "titre": "Conservez vos quittances",
                    "contenu": "Gardez-les *cinq ans*."
                })],
                _ => vec![],
            })
        });
        source
    }

    #[test]
    fn test_static_pages_ids_unique() {
        let pages = static_pages();
        let mut ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), pages.len());
        assert!(pages.iter().all(|p| p.source_type == SourceType::Page));
    }

    #[test]
    fn test_news_description_falls_back_to_content() {
        let news: Actualite = serde_json::from_value(json!({
            "id": 1,
            "titre": "Communiqué",
            "resume": "  ",
            "contenu": "# Annonce\n\nNouveaux **horaires**."
        }))
        .unwrap();
        let record = news.to_search_record();
        assert_eq!(record.id, "news-1");
        assert_eq!(record.url, "/actualites/1");
        assert_eq!(record.description, "Annonce Nouveaux horaires.");
    }

    #[test]
    fn test_news_query_filters_published() {
        let query = Actualite::catalog_query();
        assert_eq!(query.table_name(), "actualites");
        assert!(query
            .filters()
            .iter()
            .any(|f| f.column == "publie" && f.value == "true"));
    }

    #[tokio::test]
    async fn test_catalog_keeps_source_order() {
        let source = mock_source(None);
        let records = load_catalog(&source).await;

        let pages = static_pages().len();
        assert_eq!(records.len(), pages + 4);
        assert_eq!(records[pages].id, "news-5");
        assert_eq!(records[pages + 1].id, "document-b1");
        assert_eq!(records[pages + 2].id, "service-2");
        assert_eq!(records[pages + 2].description, "");
        assert_eq!(records[pages + 3].id, "tip-9");
        assert_eq!(records[pages + 3].description, "Gardez-les cinq ans.");
    }

    #[tokio::test]
    async fn test_failing_source_degrades_to_empty() {
        let source = mock_source(Some("documents"));
        let records = load_catalog(&source).await;

        assert!(records.iter().all(|r| r.source_type != SourceType::Document));
        assert!(records.iter().any(|r| r.source_type == SourceType::News));
        assert!(records.iter().any(|r| r.source_type == SourceType::Tip));
    }

    #[test]
    fn test_source_type_serialization() {
        assert_eq!(serde_json::to_value(SourceType::Tip).unwrap(), json!("tip"));
        assert_eq!(SourceType::Document.to_string(), "document");
    }
}
