//! API-relay dispatch: hand the whole recipient list to a send endpoint in a
//! single request.

use std::time::Duration;

use reqwest::Client;

use crate::{
    domain::{MessageBody, PhoneNumber},
    routes::{ErrorBody, SendRequest, SendResponse},
};

pub struct RelayClient {
    http_client: Client,
    endpoint: String,
}

#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("there are no recipients to send to")]
    NoRecipients,
    #[error("couldn't reach the send endpoint, reqwest error {0}")]
    Transport(#[from] reqwest::Error),
    #[error("the send endpoint answered {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl RelayClient {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let http_client = Client::builder().timeout(timeout).build().unwrap();
        Self {
            http_client,
            endpoint,
        }
    }

    /// One POST with every recipient; no retry. The endpoint sends
    /// sequentially, so the timeout has to cover the whole list.
    #[tracing::instrument(
        name = "Relaying recipients to the send endpoint",
        skip(self, recipients, message),
        fields(endpoint = %self.endpoint, recipients = recipients.len())
    )]
    pub async fn relay(
        &self,
        recipients: &[PhoneNumber],
        message: &MessageBody,
    ) -> Result<SendResponse, RelayError> {
        if recipients.is_empty() {
            return Err(RelayError::NoRecipients);
        }

        let request_body = SendRequest {
            recipients: recipients.iter().map(|p| p.as_ref().to_owned()).collect(),
            message: message.as_ref().to_owned(),
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
