#![cfg(feature = "ssr")]

mod common;

use serde_json::{json, Value};

async fn render(markdown: &str) -> String {
    let env = common::TestEnv::start();
    let response: Value = env
        .server()
        .post("/api/v1/render")
        .json(&json!({ "markdown": markdown }))
        .await
        .json();
    response["html"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn render_produces_paragraph_html() {
    let html = render("# Titre\n\nCorps **gras**").await;
    assert_eq!(
        html,
        "<p class=\"mb-4\"><h1>Titre</h1></p><p class=\"mb-4\">Corps <strong>gras</strong></p>"
    );
}

#[tokio::test]
async fn render_escapes_raw_html() {
    let html = render("<script>alert('x')</script>").await;
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[tokio::test]
async fn render_drops_unsafe_links() {
    let html = render("[clic](javascript:alert(1))").await;
    assert!(!html.contains("javascript:"));
    assert!(html.contains("clic"));
}

#[tokio::test]
async fn render_rejects_malformed_body() {
    let env = common::TestEnv::start();
    let response = env
        .server_permissive()
        .post("/api/v1/render")
        .json(&json!({ "texte": "oops" }))
        .await;
    assert!(response.status_code().is_client_error());
}
