//! Telegram Bot API client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use crate::error::TelegramError;
use crate::pipeline::VideoSource;
use crate::telegram::types::{File, Update};

/// Extra slack on top of the long-poll window before the HTTP request
/// itself is abandoned.
const POLL_HTTP_SLACK_SECS: u64 = 10;

/// Envelope every Bot API response arrives in.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// HTTP client for one bot token.
pub struct BotApi {
    client: reqwest::Client,
    base_url: String,
    file_base_url: String,
}

impl BotApi {
    /// Create a client for the hosted Bot API.
    pub fn new(client: reqwest::Client, token: &str) -> Self {
        Self {
            client,
            base_url: format!("https://api.telegram.org/bot{token}"),
            file_base_url: format!("https://api.telegram.org/file/bot{token}"),
        }
    }

    /// Point the client at a different server (tests, local Bot API).
    pub fn with_base_urls(mut self, base_url: String, file_base_url: String) -> Self {
        self.base_url = base_url;
        self.file_base_url = file_base_url;
        self
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError> {
        let mut request = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TelegramError::RequestFailed {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        let envelope: ApiResponse<T> =
            response
                .json()
                .await
                .map_err(|e| TelegramError::RequestFailed {
                    method: method.to_string(),
                    reason: format!("unparseable response: {}", e),
                })?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                method: method.to_string(),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        envelope.result.ok_or_else(|| TelegramError::Api {
            method: method.to_string(),
            description: "ok response without result".to_string(),
        })
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
            Some(Duration::from_secs(timeout_secs + POLL_HTTP_SLACK_SECS)),
        )
        .await
    }

    /// Send a plain-text reply.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &serde_json::json!({"chat_id": chat_id, "text": text}),
                None,
            )
            .await?;
        Ok(())
    }

    /// Send a reply rendered with Markdown.
    pub async fn send_markdown(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &serde_json::json!({
                    "chat_id": chat_id,
                    "text": text,
                    "parse_mode": "Markdown",
                }),
                None,
            )
            .await?;
        Ok(())
    }

    /// Resolve a file id to its server-side path.
    pub async fn get_file(&self, file_id: &str) -> Result<File, TelegramError> {
        self.call("getFile", &serde_json::json!({"file_id": file_id}), None)
            .await
    }

    /// Stream a file at `file_path` to local disk.
    pub async fn download_to(&self, file_path: &str, dest: &Path) -> Result<(), TelegramError> {
        let url = format!("{}/{}", self.file_base_url, file_path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TelegramError::DownloadFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TelegramError::DownloadFailed {
                reason: format!("server returned {}", response.status()),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TelegramError::DownloadFailed {
                reason: e.to_string(),
            })?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl VideoSource for BotApi {
    async fn fetch(&self, file_id: &str, dest: &Path) -> Result<(), TelegramError> {
        let file = self.get_file(file_id).await?;
        let file_path = file.file_path.ok_or_else(|| TelegramError::NoFilePath {
            file_id: file_id.to_string(),
        })?;
        self.download_to(&file_path, dest).await
    }
}
