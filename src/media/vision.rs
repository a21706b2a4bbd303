//! Vision-language analysis of still frames.
//!
//! The Gemini provider uploads the frame through the Files API, asks the
//! model to analyze it together with a text prompt, and reclaims the remote
//! upload afterwards.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MediaError;

/// Trait for vision-language providers.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Analyze an image together with a text prompt, returning the model's
    /// response verbatim.
    async fn analyze(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, MediaError>;

    /// Get the provider name.
    fn name(&self) -> &str;

    /// Check if the provider is available and configured.
    fn is_available(&self) -> bool;
}

/// Google Gemini vision provider.
pub struct GeminiVisionProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

// -- Gemini API request/response types --

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    FileData {
        #[serde(rename = "fileData")]
        file_data: GeminiFileData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiFileData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "fileUri")]
    file_uri: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    /// Resource name, e.g. `files/abc-123`.
    name: String,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiVisionProvider {
    /// Create a new Gemini vision provider.
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    /// Use a custom base URL.
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/upload/v1beta/files?key={}&uploadType=media",
            self.base_url, self.api_key
        )
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn delete_url(&self, name: &str) -> String {
        format!("{}/v1beta/{}?key={}", self.base_url, name, self.api_key)
    }

    /// Upload image bytes to the Files API.
    async fn upload(&self, image: &[u8], mime_type: &str) -> Result<UploadedFile, MediaError> {
        let response = self
            .client
            .post(self.upload_url())
            .header("Content-Type", mime_type)
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| MediaError::VisionFailed {
                reason: format!("File upload failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::VisionFailed {
                reason: format!("Upload returned {}: {}", status, api_error_message(&body)),
            });
        }

        let uploaded: UploadResponse =
            response.json().await.map_err(|e| MediaError::VisionFailed {
                reason: format!("Failed to parse upload response: {}", e),
            })?;

        Ok(uploaded.file)
    }

    /// Ask the model to analyze the uploaded image with the prompt.
    async fn generate(&self, file: &UploadedFile, mime_type: &str, prompt: &str) -> Result<String, MediaError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::FileData {
                        file_data: GeminiFileData {
                            mime_type: mime_type.to_string(),
                            file_uri: file.uri.clone(),
                        },
                    },
                    GeminiPart::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| MediaError::VisionFailed {
                reason: format!("HTTP request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::VisionFailed {
                reason: format!("Gemini returned {}: {}", status, api_error_message(&body)),
            });
        }

        let gemini_resp: GeminiResponse =
            response.json().await.map_err(|e| MediaError::VisionFailed {
                reason: format!("Failed to parse response: {}", e),
            })?;

        let content = gemini_resp
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .ok_or_else(|| MediaError::VisionFailed {
                reason: "No candidates in response".to_string(),
            })?;

        let text = content
            .parts
            .iter()
            .filter_map(|p| match p {
                GeminiPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(MediaError::VisionFailed {
                reason: "Empty response text".to_string(),
            });
        }

        Ok(text)
    }

    /// Delete the remote upload. Best-effort: failures are logged, never
    /// surfaced, and must not mask the analysis outcome.
    async fn delete_upload(&self, file: &UploadedFile) {
        match self.client.delete(self.delete_url(&file.name)).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(file = %file.name, "deleted remote upload");
            }
            Ok(response) => {
                tracing::warn!(
                    file = %file.name,
                    status = %response.status(),
                    "failed to delete remote upload"
                );
            }
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "failed to delete remote upload");
            }
        }
    }
}

/// Pull the human-readable message out of a Gemini error body, falling back
/// to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<GeminiErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.map(|d| d.message))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl VisionProvider for GeminiVisionProvider {
    async fn analyze(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, MediaError> {
        let uploaded = self.upload(image, mime_type).await?;
        let result = self.generate(&uploaded, mime_type, prompt).await;
        self.delete_upload(&uploaded).await;
        result
    }

    fn name(&self) -> &str {
        "gemini_vision"
    }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }
}
