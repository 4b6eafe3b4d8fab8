use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::Request,
    response::Response,
    routing::{get, post},
    serve::Serve,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, info_span};
use uuid::Uuid;

use crate::{
    configuration::{MessagingApiSettings, Settings},
    messaging_client::MessagingClient,
    routes::{export_links, health_check, parse_recipients, send_messages},
};

pub struct ChatLinkBaseUrl(pub String);

pub struct AppState {
    /// `None` when the messaging API credentials are missing.
    pub messaging_client: Option<MessagingClient>,
    pub chat_link_base_url: ChatLinkBaseUrl,
}

pub async fn run(
    listener: TcpListener,
    messaging_client: Option<MessagingClient>,
    chat_link_base_url: String,
) -> anyhow::Result<Serve<TcpListener, Router, Router>> {
    let app_state = Arc::new(AppState {
        messaging_client,
        chat_link_base_url: ChatLinkBaseUrl(chat_link_base_url),
    });
    let app = Router::new()
        .route("/health_check", get(health_check))
        .route("/api/send", post(send_messages))
        .route("/api/recipients/parse", post(parse_recipients))
        .route("/api/recipients/export", post(export_links))
        .with_state(app_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = Uuid::new_v4();
                    info_span!(
                        "http_request",
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        request_id = ?request_id,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    let status = response.status();
                    info!(parent: span, ?status, ?latency, "Response sent");
                }),
        );

    Ok(axum::serve(listener, app))
}

pub struct Application {
    port: u16,
    server: Serve<TcpListener, Router, Router>,
}

impl Application {
    pub async fn build(configuration: Settings) -> anyhow::Result<Self> {
        let messaging_client = get_messaging_client(&configuration.messaging_api);

        let listener = TcpListener::bind(format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        ))
        .await?;
        let port = listener.local_addr()?.port();

        let server = run(
            listener,
            messaging_client,
            configuration.chat_links.base_url,
        )
        .await?;

        Ok(Self { server, port })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        Ok(self.server.await?)
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Credentials are checked once here; handlers only see whether a client
/// exists.
pub fn get_messaging_client(configuration: &MessagingApiSettings) -> Option<MessagingClient> {
    match configuration.credentials() {
        Some((phone_number_id, access_token)) => Some(MessagingClient::new(
            configuration.base_url.clone(),
            phone_number_id,
            access_token,
            configuration.timeout(),
        )),
        None => {
            tracing::warn!("Messaging API credentials are missing, /api/send will answer 501");
            None
        }
    }
}
