use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub markdown: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResponse {
    pub html: String,
}

/// Axum handler for `POST /api/v1/render`, used by the admin preview.
#[cfg(feature = "ssr")]
pub async fn render_handler(
    axum::Json(request): axum::Json<RenderRequest>,
) -> axum::Json<RenderResponse> {
    axum::Json(RenderResponse {
        html: crate::rendering::markdown::render_markdown(&request.markdown),
    })
}
