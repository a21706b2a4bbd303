//! Error types for tahlil.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Health server error: {0}")]
    Health(#[from] HealthError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required secret: {key}. {hint}")]
    MissingSecret { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Secret store lookup failed: {0}")]
    SecretStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Telegram Bot API errors.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Request to {method} failed: {reason}")]
    RequestFailed { method: String, reason: String },

    #[error("API call {method} rejected: {description}")]
    Api { method: String, description: String },

    #[error("File download failed: {reason}")]
    DownloadFailed { reason: String },

    #[error("File {file_id} has no download path")]
    NoFilePath { file_id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Media processing errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("ffmpeg not found on PATH")]
    FfmpegNotFound,

    #[error("ffprobe not found on PATH")]
    FfprobeNotFound,

    #[error("Media extraction failed: {reason}")]
    ExtractionFailed { reason: String },

    #[error("Probe failed: {reason}")]
    ProbeFailed { reason: String },

    #[error("Transcription failed: {reason}")]
    TranscriptionFailed { reason: String },

    #[error("Vision processing failed: {reason}")]
    VisionFailed { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Job-boundary errors produced by the pipeline coordinator.
///
/// Everything except `Oversized` is collapsed to a single generic user-facing
/// message by the router; the underlying cause is logged for operators.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Video is {size} bytes, limit is {max} bytes")]
    Oversized { size: u64, max: u64 },

    #[error("Transport error: {0}")]
    Transport(#[from] TelegramError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Unexpected failure: {0}")]
    Unknown(String),
}

impl PipelineError {
    /// Whether the user receives a specific, actionable message for this
    /// error instead of the generic failure notice.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Oversized { .. })
    }
}

/// Liveness server errors.
#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Failed to bind liveness listener on {addr}: {reason}")]
    BindFailed { addr: String, reason: String },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    // --- ConfigError ---

    #[test]
    fn test_config_error_missing_secret_display() {
        let err = ConfigError::MissingSecret {
            key: "TELEGRAM_TOKEN".to_string(),
            hint: "Set TELEGRAM_TOKEN in the environment".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("TELEGRAM_TOKEN"));
        assert!(msg.contains("Set TELEGRAM_TOKEN"));
    }

    #[test]
    fn test_config_error_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            key: "PORT".to_string(),
            message: "must be a number".to_string(),
        };
        assert!(err.to_string().contains("PORT"));
        assert!(err.to_string().contains("must be a number"));
    }

    #[test]
    fn test_config_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = ConfigError::from(io_err);
        assert!(err.to_string().contains("file missing"));
    }

    // --- TelegramError ---

    #[test]
    fn test_telegram_error_request_failed_display() {
        let err = TelegramError::RequestFailed {
            method: "getUpdates".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("getUpdates"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_telegram_error_api_display() {
        let err = TelegramError::Api {
            method: "sendMessage".to_string(),
            description: "chat not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sendMessage"));
        assert!(msg.contains("chat not found"));
    }

    #[test]
    fn test_telegram_error_no_file_path_display() {
        let err = TelegramError::NoFilePath {
            file_id: "abc-123".to_string(),
        };
        assert!(err.to_string().contains("abc-123"));
    }

    // --- MediaError ---

    #[test]
    fn test_media_error_extraction_failed_display() {
        let err = MediaError::ExtractionFailed {
            reason: "moov atom not found".to_string(),
        };
        assert!(err.to_string().contains("moov atom not found"));
    }

    #[test]
    fn test_media_error_ffmpeg_not_found_display() {
        let err = MediaError::FfmpegNotFound;
        assert!(err.to_string().contains("ffmpeg"));
    }

    // --- PipelineError ---

    #[test]
    fn test_pipeline_error_oversized_display() {
        let err = PipelineError::Oversized {
            size: 26_214_400,
            max: 20_971_520,
        };
        let msg = err.to_string();
        assert!(msg.contains("26214400"));
        assert!(msg.contains("20971520"));
    }

    #[test]
    fn test_oversized_is_user_correctable() {
        let err = PipelineError::Oversized { size: 1, max: 0 };
        assert!(err.is_user_correctable());
    }

    #[test]
    fn test_other_pipeline_errors_are_not_user_correctable() {
        let extraction = PipelineError::Media(MediaError::ExtractionFailed {
            reason: "corrupt".to_string(),
        });
        assert!(!extraction.is_user_correctable());

        let unknown = PipelineError::Unknown("boom".to_string());
        assert!(!unknown.is_user_correctable());
    }

    #[test]
    fn test_pipeline_error_from_media_error() {
        let inner = MediaError::TranscriptionFailed {
            reason: "quota exceeded".to_string(),
        };
        let err = PipelineError::from(inner);
        assert!(err.to_string().contains("quota exceeded"));
    }

    // --- From conversions into top-level Error ---

    #[test]
    fn test_error_from_config_error() {
        let inner = ConfigError::SecretStore("dbus unavailable".to_string());
        let err = Error::from(inner);
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_from_pipeline_error() {
        let inner = PipelineError::Unknown("x".to_string());
        let err = Error::from(inner);
        assert!(err.to_string().contains("Pipeline error"));
    }

    #[test]
    fn test_error_from_health_error() {
        let inner = HealthError::BindFailed {
            addr: "0.0.0.0:10000".to_string(),
            reason: "in use".to_string(),
        };
        let err = Error::from(inner);
        assert!(err.to_string().contains("Health server error"));
    }
}
