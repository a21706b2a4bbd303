//! Audio and still-frame extraction from local video files.

use std::path::Path;

use async_trait::async_trait;

use crate::error::MediaError;
use crate::media::command::FfmpegCommand;
use crate::media::probe::{self, MediaProbe};

/// Trait for turning a downloaded video into pipeline artifacts.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Inspect the video: duration and audio-stream presence.
    async fn probe(&self, video: &Path) -> Result<MediaProbe, MediaError>;

    /// Extract the audio track to `dest` at a speech-model sample rate.
    async fn extract_audio(&self, video: &Path, dest: &Path) -> Result<(), MediaError>;

    /// Extract a single representative frame to `dest`.
    async fn extract_frame(&self, video: &Path, dest: &Path) -> Result<(), MediaError>;
}

/// ffmpeg-backed extractor.
pub struct FfmpegExtractor {
    sample_rate: u32,
    frame_offset: f64,
}

impl FfmpegExtractor {
    /// Create an extractor with the given audio sample rate and frame offset.
    pub fn new(sample_rate: u32, frame_offset: f64) -> Self {
        Self {
            sample_rate,
            frame_offset,
        }
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new(
            crate::config::AUDIO_SAMPLE_RATE,
            crate::config::FRAME_OFFSET_SECS,
        )
    }
}

#[async_trait]
impl MediaExtractor for FfmpegExtractor {
    async fn probe(&self, video: &Path) -> Result<MediaProbe, MediaError> {
        probe::probe(video).await
    }

    async fn extract_audio(&self, video: &Path, dest: &Path) -> Result<(), MediaError> {
        FfmpegCommand::new(video, dest)
            .no_video()
            .audio_channels(1)
            .sample_rate(self.sample_rate)
            .run()
            .await?;
        ensure_non_empty(dest, "audio").await
    }

    async fn extract_frame(&self, video: &Path, dest: &Path) -> Result<(), MediaError> {
        FfmpegCommand::new(video, dest)
            .seek(self.frame_offset)
            .single_frame()
            .run()
            .await?;
        ensure_non_empty(dest, "frame").await
    }
}

/// ffmpeg can exit 0 without writing anything (e.g. a seek past the end of a
/// very short clip), so the output file is checked explicitly.
async fn ensure_non_empty(path: &Path, what: &str) -> Result<(), MediaError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(MediaError::ExtractionFailed {
            reason: format!("ffmpeg produced no {} output", what),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_non_empty_accepts_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        tokio::fs::write(&path, b"jpeg").await.unwrap();
        assert!(ensure_non_empty(&path, "frame").await.is_ok());
    }

    #[tokio::test]
    async fn test_ensure_non_empty_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jpg");
        let err = ensure_non_empty(&path, "frame").await.unwrap_err();
        assert!(err.to_string().contains("no frame output"));
    }

    #[tokio::test]
    async fn test_ensure_non_empty_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        tokio::fs::write(&path, b"").await.unwrap();
        assert!(ensure_non_empty(&path, "audio").await.is_err());
    }

    #[test]
    fn test_default_extractor_settings() {
        let ex = FfmpegExtractor::default();
        assert_eq!(ex.sample_rate, 16_000);
        assert!((ex.frame_offset - 1.0).abs() < f64::EPSILON);
    }
}
