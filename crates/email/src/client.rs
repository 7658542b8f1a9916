use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use crmpilot_core::config::EmailConfig;
use crmpilot_core::errors::ExecutionError;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Outbound email seam. Send-only: the dispatcher never reads mailboxes.
#[async_trait]
pub trait EmailApi: Send + Sync {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<SentMessage, EmailError>;
}

#[derive(Clone, Debug, Deserialize)]
pub struct SentMessage {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email service rejected the access token; check email.access_token")]
    Auth,
    #[error("email service rejected the message: {detail}")]
    Rejected { detail: String },
    #[error("email upstream failure {status}: {detail}")]
    Upstream { status: u16, detail: String },
    #[error("email request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<EmailError> for ExecutionError {
    fn from(error: EmailError) -> Self {
        match &error {
            EmailError::Auth => ExecutionError::auth(error.to_string()),
            EmailError::Rejected { .. } => ExecutionError::invalid_input(error.to_string()),
            EmailError::Upstream { .. } | EmailError::Transport(_) => {
                ExecutionError::transport(error.to_string())
            }
        }
    }
}

/// Gmail REST client. Messages are assembled as RFC 2822 text, base64url
/// encoded, and posted to the authenticated user's send endpoint.
pub struct GmailClient {
    client: Client,
    base_url: String,
    sender: String,
    access_token: SecretString,
}

#[derive(Debug, Serialize)]
struct SendRequest {
    raw: String,
}

impl GmailClient {
    pub fn new(client: Client, config: &EmailConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sender: config.sender.clone(),
            access_token: config.access_token.clone(),
        }
    }
}

fn map_status(status: StatusCode, detail: String) -> EmailError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => EmailError::Auth,
        status if status.is_client_error() => EmailError::Rejected {
            detail: if detail.is_empty() { status.to_string() } else { detail },
        },
        // 5xx is the remote side's problem, not the message's; callers
        // may retry
        status => EmailError::Upstream { status: status.as_u16(), detail },
    }
}

/// RFC 2822 message with just the headers Gmail needs; the authenticated
/// account supplies the From address.
fn encode_message(to: &str, subject: &str, body: &str) -> String {
    let message = format!("To: {to}\r\nSubject: {subject}\r\n\r\n{body}");
    URL_SAFE.encode(message.as_bytes())
}

#[async_trait]
impl EmailApi for GmailClient {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<SentMessage, EmailError> {
        let url = format!("{}/gmail/v1/users/{}/messages/send", self.base_url, self.sender);
        let request = SendRequest { raw: encode_message(to, subject, body) };

        let response = self
            .client
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(map_status(status, detail));
        }

        let sent: SentMessage = response.json().await?;
        info!(event_name = "email.sent", message_id = %sent.id, "message accepted by gmail");
        Ok(sent)
    }
}
