use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::domain::{MessageBody, PhoneNumber};

/// Client for the third-party messaging API (WhatsApp Cloud API shape).
pub struct MessagingClient {
    http_client: Client,
    base_url: String,
    phone_number_id: String,
    access_token: SecretString,
}

#[derive(serde::Serialize)]
struct SendMessageRequest<'a> {
    messaging_product: &'a str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    text: TextBody<'a>,
}

#[derive(serde::Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(serde::Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(serde::Deserialize)]
struct SentMessage {
    id: String,
}

#[derive(thiserror::Error, Debug)]
pub enum MessagingError {
    #[error("couldn't reach the messaging api, reqwest error {0}")]
    Transport(#[from] reqwest::Error),
    #[error("the messaging api answered {status}")]
    Api { status: u16, body: Value },
}

impl MessagingError {
    /// What gets recorded for a failed recipient: the API's own error
    /// payload when there is one, the error text otherwise.
    pub fn details(&self) -> Value {
        match self {
            MessagingError::Api { body, .. } if !body.is_null() => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

impl MessagingClient {
    pub fn new(
        base_url: String,
        phone_number_id: String,
        access_token: SecretString,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder().timeout(timeout).build().unwrap();
        Self {
            http_client,
            base_url,
            phone_number_id,
            access_token,
        }
    }

    /// Sends one text message and returns the id the API assigned to it,
    /// if it reported one.
    pub async fn send_text(
        &self,
        to: &PhoneNumber,
        message: &MessageBody,
    ) -> Result<Option<String>, MessagingError> {
        let url = format!(
            "{}/{}/messages",
            self.base_url.trim_end_matches('/'),
            self.phone_number_id
        );
        let request_body = SendMessageRequest {
            messaging_product: "whatsapp",
            to: to.as_ref(),
            kind: "text",
            text: TextBody {
                body: message.as_ref(),
            },
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str(&text).unwrap_or(if text.is_empty() {
                Value::Null
            } else {
                Value::String(text)
            });
            return Err(MessagingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let sent: SendMessageResponse = response.json().await?;
        Ok(sent.messages.into_iter().next().map(|message| message.id))
    }
}
