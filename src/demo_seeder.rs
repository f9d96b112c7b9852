use serde_json::{json, Value};

use crate::db::memory::MemoryRowSource;

/// Fill an in-memory store with sample portal content.
///
/// Used when no Supabase project is configured so the portal can be
/// browsed and searched locally.
pub fn seed_demo_data(rows: &MemoryRowSource) {
    tracing::info!("Starting demo data seeding...");

    // Markdown bodies are embedded directly into the binary
    let news = vec![
        (
            1,
            "Campagne vignette 2026",
            Some("Ouverture de la campagne de paiement de la vignette automobile."),
            include_str!("../demo_data/campagne_vignette.md"),
            "2026-01-05T08:00:00Z",
            true,
        ),
        (
            2,
            "Digitalisation des recettes",
            None,
            include_str!("../demo_data/digitalisation.md"),
            "2026-02-12T09:30:00Z",
            true,
        ),
        (
            3,
            "Rappel des échéances",
            Some("Date limite de déclaration de l'impôt foncier."),
            include_str!("../demo_data/rappel_echeances.md"),
            "2025-12-20T10:00:00Z",
            false,
        ),
    ];
    let news: Vec<Value> = news
        .into_iter()
        .map(|(id, titre, resume, contenu, date, publie)| {
            json!({
                "id": id,
                "titre": titre,
                "resume": resume,
                "contenu": contenu,
                "categorie": "communique",
                "publie": publie,
                "date_publication": date,
            })
        })
        .collect();
    seed(rows, "actualites", news);

    seed(
        rows,
        "documents",
        vec![
            json!({"id": 1, "titre": "Édit portant nomenclature des impôts", "description": "Texte de référence des impôts, droits et taxes provinciaux.", "categorie": "edit", "fichier_url": "/fichiers/edit-nomenclature.pdf", "date_publication": "2024-06-30"}),
            json!({"id": 2, "titre": "Arrêté fixant les taux de la vignette", "description": "Barème applicable aux véhicules automoteurs.", "categorie": "arrete", "fichier_url": "/fichiers/arrete-vignette.pdf", "date_publication": "2025-11-15"}),
        ],
    );

    seed(
        rows,
        "services",
        vec![
            json!({"id": 1, "nom": "Vignette automobile", "description": "Paiement et retrait de la vignette annuelle.", "icone": "car", "ordre": 1, "actif": true}),
            json!({"id": 2, "nom": "Impôt foncier", "description": "Déclaration et paiement de l'impôt sur les propriétés bâties.", "icone": "home", "ordre": 2, "actif": true}),
            json!({"id": 3, "nom": "Taxe de voirie", "description": "Service suspendu pendant la révision du barème.", "icone": "road", "ordre": 3, "actif": false}),
        ],
    );

    seed(
        rows,
        "conseils",
        vec![
            json!({"id": 1, "titre": "Conservez vos quittances", "contenu": "Gardez la **quittance** de paiement pendant au moins cinq ans."}),
            json!({"id": 2, "titre": "Vérifiez l'agent", "contenu": "Exigez toujours la carte de service de l'agent taxateur."}),
        ],
    );

    seed(
        rows,
        "chiffres_cles",
        vec![
            json!({"id": 1, "libelle": "Contribuables enregistrés", "valeur": "48 200", "ordre": 1}),
            json!({"id": 2, "libelle": "Antennes provinciales", "valeur": "12", "ordre": 2}),
            json!({"id": 3, "libelle": "Taux de réalisation", "valeur": "87", "unite": "%", "ordre": 3}),
        ],
    );

    seed(
        rows,
        "entites_cartographie",
        vec![
            json!({"id": 1, "nom": "Direction générale", "type_entite": "siege", "latitude": 3.2556, "longitude": 19.7722, "adresse": "Avenue du Gouverneur, Gbadolite"}),
            json!({"id": 2, "nom": "Antenne de Businga", "type_entite": "antenne", "latitude": 3.3389, "longitude": 20.8717}),
            json!({"id": 3, "nom": "Antenne de Mobayi-Mbongo", "type_entite": "antenne", "latitude": 4.3019, "longitude": 21.1795}),
        ],
    );

    seed(
        rows,
        "baremes",
        vec![
            json!({"id": 1, "impot": "vignette", "tranche_min": 0.0, "tranche_max": 10.0, "taux": 0.0, "montant_fixe": 38.0}),
            json!({"id": 2, "impot": "vignette", "tranche_min": 10.0, "tranche_max": null, "taux": 0.0, "montant_fixe": 58.0}),
            json!({"id": 3, "impot": "foncier", "tranche_min": 0.0, "tranche_max": 500.0, "taux": 0.5}),
            json!({"id": 4, "impot": "foncier", "tranche_min": 500.0, "tranche_max": null, "taux": 0.8}),
        ],
    );

    tracing::info!("Demo data seeding complete.");
}

fn seed(rows: &MemoryRowSource, table: &str, items: Vec<Value>) {
    tracing::info!(table, count = items.len(), "Seeding demo rows");
    rows.seed(table, items);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Actualite, Bareme, EntiteCartographique, Service};
    use crate::db::rows::{fetch_typed, RowQuery};
    use crate::search::catalog::load_catalog;

    #[tokio::test]
    async fn test_seeded_rows_decode() {
        let rows = MemoryRowSource::new();
        seed_demo_data(&rows);

        let news: Vec<Actualite> = fetch_typed(&rows, RowQuery::table("actualites")).await.unwrap();
        assert_eq!(news.len(), 3);
        let services: Vec<Service> = fetch_typed(&rows, RowQuery::table("services")).await.unwrap();
        assert_eq!(services.len(), 3);
        let entities: Vec<EntiteCartographique> =
            fetch_typed(&rows, RowQuery::table("entites_cartographie")).await.unwrap();
        assert!(entities.iter().all(|e| e.has_valid_position()));
        let baremes: Vec<Bareme> = fetch_typed(&rows, RowQuery::table("baremes")).await.unwrap();
        assert_eq!(baremes.len(), 4);
    }

    #[tokio::test]
    async fn test_catalog_hides_drafts_and_inactive() {
        let rows = MemoryRowSource::new();
        seed_demo_data(&rows);
        let catalog = load_catalog(&rows).await;
        assert!(!catalog.iter().any(|r| r.title == "Rappel des échéances"));
        assert!(!catalog.iter().any(|r| r.title == "Taxe de voirie"));
        assert!(catalog.iter().any(|r| r.title == "Vignette automobile"));
    }
}
