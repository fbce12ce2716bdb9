//! Telegram Bot API transport (`sendMessage`, `sendPhoto`).

use doorwatch_core::{ContactId, Transport, TransportError};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Envelope of every Bot API reply.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramTransport {
    client: Client,
    /// `<api_url>/bot<token>`. Never logged.
    base_url: String,
}

impl TelegramTransport {
    pub fn new(api_url: &str, token: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: bot_base_url(api_url, token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }
}

fn bot_base_url(api_url: &str, token: &str) -> String {
    format!("{}/bot{token}", api_url.trim_end_matches('/'))
}

// Drop the URL from reqwest errors; it carries the bot token.
fn request_error(e: reqwest::Error) -> TransportError {
    TransportError::Request(e.without_url().to_string())
}

fn check_reply(reply: ApiReply) -> Result<(), TransportError> {
    if reply.ok {
        Ok(())
    } else {
        Err(TransportError::Rejected(
            reply.description.unwrap_or_else(|| "no description".to_string()),
        ))
    }
}

fn read_reply(response: Response) -> Result<(), TransportError> {
    let reply: ApiReply = response.json().map_err(request_error)?;
    check_reply(reply)
}

impl Transport for TelegramTransport {
    fn send_message(&mut self, recipient: &ContactId, text: &str) -> Result<(), TransportError> {
        let body = serde_json::json!({
            "chat_id": recipient.as_str(),
            "text": text,
        });
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .map_err(request_error)?;
        read_reply(response)?;
        tracing::debug!(recipient = %recipient, "message sent");
        Ok(())
    }

    fn send_photo(&mut self, recipient: &ContactId, png: &[u8]) -> Result<(), TransportError> {
        let photo = Part::bytes(png.to_vec())
            .file_name("door.png")
            .mime_str("image/png")
            .map_err(request_error)?;
        let form = Form::new()
            .text("chat_id", recipient.as_str().to_string())
            .part("photo", photo);
        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .map_err(request_error)?;
        read_reply(response)?;
        tracing::debug!(recipient = %recipient, bytes = png.len(), "photo sent");
        Ok(())
    }
}
