use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::models::Message;
use crate::db::rows::{RowSource, Table};
use crate::error::AppError;

const MAX_FIELD_CHARS: usize = 5_000;

/// Body of `POST /api/v1/messages` sent by the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub nom: String,
    pub email: String,
    #[serde(default)]
    pub sujet: Option<String>,
    pub contenu: String,
}

impl ContactRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.nom.trim().is_empty() {
            return Err(AppError::BadRequest("nom is required".into()));
        }
        if self.contenu.trim().is_empty() {
            return Err(AppError::BadRequest("contenu is required".into()));
        }
        let email = self.email.trim();
        let valid_email = matches!(
            email.split_once('@'),
            Some((user, domain)) if !user.is_empty() && domain.contains('.')
        );
        if !valid_email {
            return Err(AppError::BadRequest(format!("Invalid email '{email}'")));
        }
        if self.contenu.chars().count() > MAX_FIELD_CHARS {
            return Err(AppError::BadRequest("contenu is too long".into()));
        }
        Ok(())
    }
}

/// Store a visitor message as unread.
pub async fn submit_message(
    rows: &dyn RowSource,
    request: ContactRequest,
) -> Result<Message, AppError> {
    request.validate()?;

    let row = json!({
        "nom": request.nom.trim(),
        "email": request.email.trim(),
        "sujet": request.sujet.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        "contenu": request.contenu.trim(),
        "lu": false,
    });

    let stored = rows.insert_row(Message::NAME, row).await?;
    let message: Message = serde_json::from_value(stored)
        .map_err(|e| AppError::Backend(format!("Unexpected message row: {e}")))?;

    tracing::info!(id = %message.id, "Contact message received");
    Ok(message)
}

/// Axum handler for `POST /api/v1/messages`.
#[cfg(feature = "ssr")]
pub async fn contact_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
    axum::Json(request): axum::Json<ContactRequest>,
) -> Result<(axum::http::StatusCode, axum::Json<Message>), AppError> {
    let message = submit_message(state.rows.as_ref(), request).await?;
    Ok((axum::http::StatusCode::CREATED, axum::Json(message)))
}
