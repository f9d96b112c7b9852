#![cfg(feature = "ssr")]

mod common;

use drnoflu::db::memory::MemoryRowSource;
use drnoflu::search::matcher::AggregationPolicy;
use serde_json::{json, Value};

#[tokio::test]
async fn search_is_accent_and_case_insensitive() {
    let env = common::TestEnv::start();
    let server = env.server();

    let response = server
        .get("/api/v1/search")
        .add_query_param("q", "ECHEANCES")
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    // The matching news item is a draft, only published content is searchable
    assert!(results.iter().all(|r| r["title"] != "Rappel des échéances"));

    let response = server
        .get("/api/v1/search")
        .add_query_param("q", "foncier")
        .await;
    let results: Vec<Value> = response.json();
    assert!(
        results.iter().any(|r| r["title"] == "Impôt foncier" && r["source_type"] == "service"),
        "Service should match its title. Results: {:?}",
        results
    );
}

#[tokio::test]
async fn search_requires_every_token() {
    let env = common::TestEnv::start();
    let server = env.server();

    let results: Vec<Value> = server
        .get("/api/v1/search")
        .add_query_param("q", "vignette automobile")
        .await
        .json();
    assert!(!results.is_empty());
    for result in &results {
        let text = format!("{} {}", result["title"], result["description"]).to_lowercase();
        assert!(text.contains("vignette") && text.contains("automobile"));
    }

    let results: Vec<Value> = server
        .get("/api/v1/search")
        .add_query_param("q", "vignette introuvablexyz")
        .await
        .json();
    assert!(results.is_empty());
}

#[tokio::test]
async fn blank_query_returns_nothing() {
    let env = common::TestEnv::start();
    let results: Vec<Value> = env
        .server()
        .get("/api/v1/search")
        .add_query_param("q", "   ")
        .await
        .json();
    assert!(results.is_empty());
}

#[tokio::test]
async fn results_are_capped_in_source_order() {
    let rows = MemoryRowSource::new();
    rows.seed(
        "actualites",
        (1..=25)
            .map(|n| json!({"id": n, "titre": format!("Collecte {n}"), "publie": true}))
            .collect(),
    );
    rows.seed(
        "services",
        vec![json!({"id": 1, "nom": "Collecte en ligne", "actif": true})],
    );
    let env = common::TestEnv::with_rows(rows, AggregationPolicy::SourceOrder);

    let results: Vec<Value> = env
        .server()
        .get("/api/v1/search")
        .add_query_param("q", "collecte")
        .await
        .json();
    assert_eq!(results.len(), 20);
    assert!(results.iter().all(|r| r["source_type"] == "news"));

    let results: Vec<Value> = env
        .server()
        .get("/api/v1/search")
        .add_query_param("q", "collecte")
        .add_query_param("cap", 30)
        .await
        .json();
    assert_eq!(results.len(), 26);
    assert_eq!(results[25]["source_type"], "service");
}

#[tokio::test]
async fn quota_policy_keeps_every_source_visible() {
    let rows = MemoryRowSource::new();
    rows.seed(
        "actualites",
        (1..=25)
            .map(|n| json!({"id": n, "titre": format!("Collecte {n}"), "publie": true}))
            .collect(),
    );
    rows.seed(
        "services",
        vec![json!({"id": 1, "nom": "Collecte en ligne", "actif": true})],
    );
    let env = common::TestEnv::with_rows(rows, AggregationPolicy::PerSourceQuota);

    let results: Vec<Value> = env
        .server()
        .get("/api/v1/search")
        .add_query_param("q", "collecte")
        .await
        .json();
    assert_eq!(results.len(), 20);
    assert!(results.iter().any(|r| r["source_type"] == "service"));
}

#[tokio::test]
async fn failing_source_degrades_gracefully() {
    let rows = MemoryRowSource::new();
    rows.seed(
        "services",
        vec![json!({"id": 1, "nom": "Vignette automobile", "actif": true})],
    );
    rows.fail_table("actualites");
    let env = common::TestEnv::with_rows(rows, AggregationPolicy::SourceOrder);

    let response = env
        .server()
        .get("/api/v1/search")
        .add_query_param("q", "vignette")
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "service-1");
}

#[tokio::test]
async fn catalog_lists_static_pages_first() {
    let env = common::TestEnv::start();
    let catalog: Vec<Value> = env.server().get("/api/v1/search/catalog").await.json();

    assert!(!catalog.is_empty());
    assert_eq!(catalog[0]["source_type"], "page");
    let first_dynamic = catalog
        .iter()
        .position(|r| r["source_type"] != "page")
        .expect("catalog should contain backend rows");
    assert!(catalog[first_dynamic..].iter().all(|r| r["source_type"] != "page"));
}
