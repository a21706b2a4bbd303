//! Audio transcription via external APIs.
//!
//! Speaks the OpenAI-compatible `audio/transcriptions` endpoint, which Groq
//! exposes for its hosted Whisper models.

use async_trait::async_trait;

use crate::error::MediaError;

/// Trait for transcription providers.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribe audio data to plain text.
    ///
    /// # Arguments
    /// * `data` - Raw audio bytes
    /// * `filename` - Name the audio is presented under (extension matters)
    /// * `language` - Target language code (ISO 639-1)
    async fn transcribe(
        &self,
        data: &[u8],
        filename: &str,
        language: &str,
    ) -> Result<String, MediaError>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Check if the provider is available and configured.
    fn is_available(&self) -> bool;
}

/// Groq-hosted Whisper transcription provider.
pub struct GroqWhisperProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqWhisperProvider {
    /// Create a new Groq Whisper provider.
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        Self {
            client,
            api_key,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "whisper-large-v3".to_string(),
        }
    }

    /// Use a custom base URL (for OpenAI-compatible endpoints).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

#[async_trait]
impl TranscriptionProvider for GroqWhisperProvider {
    async fn transcribe(
        &self,
        data: &[u8],
        filename: &str,
        language: &str,
    ) -> Result<String, MediaError> {
        let file_part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("audio/wav")
            .map_err(|e| MediaError::TranscriptionFailed {
                reason: format!("Failed to create multipart: {}", e),
            })?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("language", language.to_string())
            .text("response_format", "text");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::TranscriptionFailed {
                reason: format!("HTTP request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::TranscriptionFailed {
                reason: format!("Transcription API returned {}: {}", status, body),
            });
        }

        // response_format=text returns the transcript as the raw body.
        let text = response
            .text()
            .await
            .map_err(|e| MediaError::TranscriptionFailed {
                reason: format!("Failed to read response: {}", e),
            })?;

        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        "groq_whisper"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}
