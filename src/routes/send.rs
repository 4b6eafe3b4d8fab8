use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{MessageBody, PhoneNumber},
    messaging_client::MessagingClient,
    startup::AppState,
};

#[derive(Deserialize, Serialize, Debug)]
pub struct SendRequest {
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub message: String,
}

/// Outcome for one recipient, in request order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SendResult {
    pub to: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SendResponse {
    pub count: usize,
    pub results: Vec<SendResult>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

#[tracing::instrument(
    name = "Sending a message to every recipient",
    skip(payload, app_state)
)]
pub async fn send_messages(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, SendError> {
    let Json(payload) = payload.map_err(|e| SendError::InvalidPayload(e.body_text()))?;

    if payload.recipients.is_empty() {
        return Err(SendError::InvalidPayload(
            "`recipients` must be a non-empty array of phone numbers.".to_string(),
        ));
    }
    let message = MessageBody::parse(payload.message).map_err(SendError::InvalidPayload)?;

    let messaging_client = app_state
        .messaging_client
        .as_ref()
        .ok_or(SendError::NotConfigured)?;

    // One recipient at a time; a failure is recorded and the loop moves on.
    let mut results = Vec::with_capacity(payload.recipients.len());
    for to in payload.recipients {
        results.push(send_to_recipient(messaging_client, to, &message).await);
    }

    let count = results.iter().filter(|result| result.ok).count();
    tracing::info!(count, total = results.len(), "Finished sending");

    Ok(Json(SendResponse { count, results }))
}

#[tracing::instrument(name = "Sending to one recipient", skip(messaging_client, message))]
async fn send_to_recipient(
    messaging_client: &MessagingClient,
    to: String,
    message: &MessageBody,
) -> SendResult {
    let phone = match PhoneNumber::parse(&to) {
        Ok(phone) => phone,
        Err(e) => {
            tracing::warn!("{}", e);
            return SendResult {
                to,
                ok: false,
                id: None,
                error: Some(Value::String(e)),
            };
        }
    };

    match messaging_client.send_text(&phone, message).await {
        Ok(id) => SendResult {
            to,
            ok: true,
            id,
            error: None,
        },
        Err(e) => {
            tracing::error!("{}", e);
            SendResult {
                to,
                ok: false,
                id: None,
                error: Some(e.details()),
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SendError {
    #[error("{0}")]
    InvalidPayload(String),
    #[error("Messaging API credentials are not configured on the server.")]
    NotConfigured,
}

impl IntoResponse for SendError {
    fn into_response(self) -> Response {
        let status = match &self {
            SendError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            SendError::NotConfigured => StatusCode::NOT_IMPLEMENTED,
        };
        tracing::error!("{}", self);
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
