//! Runtime configuration sourced from the environment.

use std::env;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::secrets;

/// Maximum accepted video size in bytes (20 MiB). Exactly this size is
/// still admitted.
pub const MAX_VIDEO_BYTES: u64 = 20 * 1024 * 1024;

/// Sample rate for extracted audio, what speech models expect.
pub const AUDIO_SAMPLE_RATE: u32 = 16_000;

/// Offset into the video at which the still frame is taken.
pub const FRAME_OFFSET_SECS: f64 = 1.0;

/// Language code transcripts and analyses are produced in.
pub const TARGET_LANGUAGE: &str = "uz";

/// Speech model used for transcription.
pub const WHISPER_MODEL: &str = "whisper-large-v3";

/// Vision-language model used for the final analysis.
pub const GEMINI_MODEL: &str = "gemini-flash-latest";

const DEFAULT_PORT: u16 = 10_000;

/// Process configuration.
pub struct Config {
    pub telegram_token: SecretString,
    pub groq_api_key: SecretString,
    pub gemini_api_key: SecretString,
    /// Port the liveness listener binds.
    pub port: u16,
    /// Directory job artifacts are materialized under.
    pub workdir: PathBuf,
}

impl Config {
    /// Load configuration. Credentials come from the environment first, then
    /// the platform secret store; a missing credential is fatal.
    pub async fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            telegram_token: require_secret(
                "TELEGRAM_TOKEN",
                "Set TELEGRAM_TOKEN to the bot token issued by @BotFather",
            )
            .await?,
            groq_api_key: require_secret(
                "GROQ_API_KEY",
                "Set GROQ_API_KEY to a Groq API key for transcription",
            )
            .await?,
            gemini_api_key: require_secret(
                "GEMINI_API_KEY",
                "Set GEMINI_API_KEY to a Google AI Studio API key",
            )
            .await?,
            port: parse_port(env::var("PORT").ok().as_deref())?,
            workdir: env::var("TAHLIL_WORKDIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
        })
    }
}

async fn require_secret(key: &str, hint: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = env::var(key) {
        if !value.is_empty() {
            return Ok(SecretString::from(value));
        }
    }
    if let Some(value) = secrets::lookup(key).await? {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingSecret {
        key: key.to_string(),
        hint: hint.to_string(),
    })
}

fn parse_port(value: Option<&str>) -> Result<u16, ConfigError> {
    match value {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "PORT".to_string(),
            message: format!("'{raw}' is not a valid port number"),
        }),
    }
}
