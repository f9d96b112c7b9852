#![cfg(feature = "ssr")]

mod common;

use common::TEST_TOKEN;
use serde_json::{json, Value};

#[tokio::test]
async fn admin_write_requires_token() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    server
        .post("/api/v1/admin/conseils")
        .json(&json!({"titre": "Sans jeton"}))
        .await
        .assert_status_unauthorized();

    server
        .post("/api/v1/admin/conseils")
        .authorization_bearer("wrong-token")
        .json(&json!({"titre": "Mauvais jeton"}))
        .await
        .assert_status_unauthorized();

    assert_eq!(env.rows.rows("conseils").len(), 2);
}

#[tokio::test]
async fn create_update_delete_are_journaled() {
    let env = common::TestEnv::start();
    let server = env.server();

    let created: Value = server
        .post("/api/v1/admin/actualites")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"titre": "Nouveau communiqué", "contenu": "# Annonce", "publie": true}))
        .await
        .json();
    let id = created["id"].to_string();

    let updated: Value = server
        .put(&format!("/api/v1/admin/actualites/{id}"))
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"resume": "Résumé ajouté"}))
        .await
        .json();
    assert_eq!(updated["resume"], "Résumé ajouté");
    assert_eq!(updated["titre"], "Nouveau communiqué");

    server
        .delete(&format!("/api/v1/admin/actualites/{id}"))
        .authorization_bearer(TEST_TOKEN)
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);

    let journal = env.rows.rows("journal_activites");
    let actions: Vec<&str> = journal
        .iter()
        .filter_map(|entry| entry["action"].as_str())
        .collect();
    assert_eq!(actions, vec!["create", "update", "delete"]);
    assert!(journal.iter().all(|entry| entry["element_id"] == id.as_str()));
}

#[tokio::test]
async fn created_news_becomes_searchable() {
    let env = common::TestEnv::start();
    let server = env.server();

    server
        .post("/api/v1/admin/actualites")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"titre": "Péage de Yakoma", "contenu": "Ouverture du poste", "publie": true}))
        .await;

    let results: Vec<Value> = server
        .get("/api/v1/search")
        .add_query_param("q", "peage")
        .await
        .json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["source_type"], "news");
}

#[tokio::test]
async fn missing_required_column_is_rejected() {
    let env = common::TestEnv::start();
    env.server_permissive()
        .post("/api/v1/admin/services")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"description": "Sans nom"}))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn unknown_row_and_table_are_not_found() {
    let env = common::TestEnv::start();
    let server = env.server_permissive();

    server
        .delete("/api/v1/admin/services/999")
        .authorization_bearer(TEST_TOKEN)
        .await
        .assert_status_not_found();

    server
        .post("/api/v1/admin/utilisateurs")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"nom": "x"}))
        .await
        .assert_status_not_found();
}
