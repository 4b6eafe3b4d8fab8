use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::{IntoResponse, Response},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{MessageBody, PhoneNumber, RecipientList, RejectedToken},
    routes::ErrorBody,
    startup::AppState,
};

/// File name offered for the chat link export.
pub const EXPORT_FILE_NAME: &str = "wa-links.txt";

#[derive(Serialize, Debug)]
pub struct ParsedRecipients {
    pub count: usize,
    pub recipients: Vec<PhoneNumber>,
    pub rejected: Vec<RejectedToken>,
    pub duplicates: usize,
}

impl From<RecipientList> for ParsedRecipients {
    fn from(list: RecipientList) -> Self {
        let rejected = list.rejected().to_vec();
        let duplicates = list.duplicates();
        let recipients: Vec<PhoneNumber> = list.into();
        Self {
            count: recipients.len(),
            recipients,
            rejected,
            duplicates,
        }
    }
}

/// The body is raw text: pasted numbers or the whole content of an
/// uploaded `.txt`/`.csv` file. No column or header handling.
#[tracing::instrument(name = "Parsing recipients", skip(text), fields(bytes = text.len()))]
pub async fn parse_recipients(text: String) -> Json<ParsedRecipients> {
    let list = RecipientList::parse(&text);
    tracing::info!(
        accepted = list.len(),
        rejected = list.rejected().len(),
        "Parsed recipients"
    );
    Json(list.into())
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ExportRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub message: String,
}

#[tracing::instrument(name = "Exporting chat links", skip(payload, app_state))]
pub async fn export_links(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ExportError> {
    let Json(payload) = payload.map_err(|e| ExportError::InvalidPayload(e.body_text()))?;
    let message = MessageBody::parse(payload.message).map_err(ExportError::InvalidPayload)?;

    let list = RecipientList::parse(&payload.text);
    let body = list.export_links(&app_state.chat_link_base_url.0, &message);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        body,
    ))
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("{0}")]
    InvalidPayload(String),
}

impl IntoResponse for ExportError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
